// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node runtime: one protocol state behind a mutex, driven from two sides
//!
//! The application calls [`NodeRuntime::cs_enter`] and
//! [`NodeRuntime::cs_leave`]; the network side calls
//! [`NodeRuntime::deliver`] for every inbound message. Handlers run under the
//! state lock and return effects, which are executed after the lock is
//! released. Messages a node addresses to itself are routed back through the
//! same lock rather than the transport.

use crate::error::EngineError;
use crate::executor::Executor;
use mkw_adapters::Transport;
use mkw_core::{route, Effect, Message, NodeId, NodeState, Role};
use mkw_storage::AuditSink;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{Instrument, Span};

struct Inner<T, A> {
    state: Mutex<NodeState>,
    wake: Arc<Notify>,
    executor: Executor<T, A>,
    span: Span,
}

/// Shared handle to a node; clones drive the same state
pub struct NodeRuntime<T, A> {
    inner: Arc<Inner<T, A>>,
}

impl<T, A> Clone for NodeRuntime<T, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, A> NodeRuntime<T, A>
where
    T: Transport,
    A: AuditSink,
{
    pub fn new(state: NodeState, transport: T, audit: A) -> Self {
        let id = state.id();
        let wake = Arc::new(Notify::new());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                executor: Executor::new(id, transport, audit, Arc::clone(&wake)),
                wake,
                span: tracing::info_span!("node", id = %id),
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.lock().id()
    }

    /// Copy of the current protocol state
    pub fn snapshot(&self) -> NodeState {
        self.lock().clone()
    }

    pub fn transport(&self) -> &T {
        self.inner.executor.transport()
    }

    pub fn audit(&self) -> &A {
        self.inner.executor.audit()
    }

    /// Block until every quorum member has granted this node, then enter.
    ///
    /// Dropping the returned future abandons the wait and leaves the attempt
    /// outstanding; call [`cs_leave`](Self::cs_leave) to withdraw it.
    pub async fn cs_enter(&self) -> Result<(), EngineError> {
        self.enter().instrument(self.inner.span.clone()).await
    }

    /// [`cs_enter`](Self::cs_enter) with a deadline
    pub async fn cs_enter_within(&self, timeout: Duration) -> Result<(), EngineError> {
        match tokio::time::timeout(timeout, self.cs_enter()).await {
            Ok(result) => result,
            Err(_) => {
                self.inner.span.in_scope(|| {
                    tracing::warn!(
                        timeout_ms = timeout.as_millis() as u64,
                        "critical section wait timed out"
                    )
                });
                Err(EngineError::TimedOut(timeout))
            }
        }
    }

    /// Leave the critical section, or withdraw an outstanding attempt
    pub async fn cs_leave(&self) -> Result<(), EngineError> {
        async {
            let effects = {
                let mut state = self.lock();
                if state.role() == Role::Released {
                    return Err(EngineError::NotRequesting);
                }
                state.leave()
            };
            tracing::debug!("leaving");
            self.run(effects).await;
            Ok(())
        }
        .instrument(self.inner.span.clone())
        .await
    }

    /// Handle one inbound message from a peer
    pub async fn deliver(&self, msg: Message) {
        async {
            tracing::debug!(kind = %msg.kind, from = %msg.from, "received");
            let effects = route(&mut self.lock(), msg);
            self.run(effects).await;
        }
        .instrument(self.inner.span.clone())
        .await
    }

    async fn enter(&self) -> Result<(), EngineError> {
        let effects = {
            let mut state = self.lock();
            if state.in_cs() {
                return Err(EngineError::AlreadyInCriticalSection);
            }
            let (request, effects) = state.begin_request();
            tracing::debug!(seqnum = request.seqnum, "requesting");
            effects
        };
        self.run(effects).await;

        loop {
            let notified = self.inner.wake.notified();
            tokio::pin!(notified);
            // Register before checking so a wake between check and await is kept
            notified.as_mut().enable();

            let entered = {
                let mut state = self.lock();
                if state.quorum_reached() {
                    Some(state.enter())
                } else {
                    None
                }
            };
            if let Some(effects) = entered {
                self.run(effects).await;
                return Ok(());
            }
            notified.await;
        }
    }

    /// Execute effects in order, routing self-addressed messages locally
    async fn run(&self, effects: Vec<Effect>) {
        let mut pending = VecDeque::from(effects);
        while let Some(effect) = pending.pop_front() {
            if let Some(msg) = self.inner.executor.execute(effect).await {
                let more = route(&mut self.lock(), msg);
                pending.extend(more);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
