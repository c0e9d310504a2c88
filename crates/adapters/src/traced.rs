// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use mkw_core::Message;
use tracing::Instrument;

/// Wrapper that adds tracing to any Transport
#[derive(Clone)]
pub struct TracedTransport<T> {
    inner: T,
}

impl<T> TracedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for TracedTransport<T> {
    async fn send(&self, msg: Message) -> Result<(), TransportError> {
        let span = tracing::info_span!(
            "transport.send",
            kind = %msg.kind,
            from = %msg.from,
            to = %msg.to,
            seqnum = msg.request.map(|r| r.seqnum),
        );

        async {
            tracing::trace!("queueing");
            let result = self.inner.send(msg).await;
            match &result {
                Ok(()) => tracing::trace!("queued"),
                Err(e) => tracing::warn!(error = %e, "send failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
