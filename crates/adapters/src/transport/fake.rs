// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake transport for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Transport, TransportError};
use async_trait::async_trait;
use mkw_core::Message;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Default)]
struct FakeState {
    sent: Vec<Message>,
    failing: bool,
    forward: Option<mpsc::UnboundedSender<Message>>,
}

/// Records every message sent and optionally forwards it to a channel
#[derive(Clone, Default)]
pub struct FakeTransport {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that also pushes each sent message into `tx`
    pub fn forwarding(tx: mpsc::UnboundedSender<Message>) -> Self {
        let transport = Self::default();
        transport.lock().forward = Some(tx);
        transport
    }

    /// All messages sent so far
    pub fn sent(&self) -> Vec<Message> {
        self.lock().sent.clone()
    }

    /// Drain the recorded messages
    pub fn take_sent(&self) -> Vec<Message> {
        std::mem::take(&mut self.lock().sent)
    }

    /// Make subsequent sends fail without recording
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, msg: Message) -> Result<(), TransportError> {
        let mut state = self.lock();
        if state.failing {
            return Err(TransportError::Closed(msg.to));
        }
        if let Some(tx) = &state.forward {
            // Receiver gone means the test is done listening
            let _ = tx.send(msg.clone());
        }
        state.sent.push(msg);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
