// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use mkw_adapters::Transport;
use mkw_core::{Effect, Message, NodeId};
use mkw_storage::{AuditEntry, AuditSink};
use std::sync::Arc;
use tokio::sync::Notify;

/// Executes effects using the node's transport and audit sink
pub struct Executor<T, A> {
    node: NodeId,
    transport: T,
    audit: A,
    wake: Arc<Notify>,
}

impl<T, A> Executor<T, A>
where
    T: Transport,
    A: AuditSink,
{
    pub fn new(node: NodeId, transport: T, audit: A, wake: Arc<Notify>) -> Self {
        Self {
            node,
            transport,
            audit,
            wake,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    /// Execute a single effect
    ///
    /// A message addressed to this node is handed back instead of sent; the
    /// caller routes it through the local state. Failures are logged and
    /// never returned.
    pub async fn execute(&self, effect: Effect) -> Option<Message> {
        match effect {
            Effect::Send(msg) if msg.to == self.node => Some(msg),
            Effect::Send(msg) => {
                tracing::debug!(kind = %msg.kind, to = %msg.to, "send");
                if let Err(e) = self.transport.send(msg).await {
                    tracing::warn!(error = %e, "transport rejected message");
                }
                None
            }
            Effect::Record(event) => {
                let entry = AuditEntry::now(self.node, event);
                tracing::info!(event = %event, timestamp_ms = entry.timestamp_ms, "critical section");
                if let Err(e) = self.audit.record(&entry) {
                    tracing::error!(error = %e, "failed to write audit record");
                }
                None
            }
            Effect::WakeRequester => {
                self.wake.notify_waiters();
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
