// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound message delivery to peer nodes

mod tcp;

pub use tcp::{RetryPolicy, TcpTransport};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTransport;

use crate::protocol::ProtocolError;
use async_trait::async_trait;
use mkw_core::{Message, NodeId};
use thiserror::Error;

/// Errors from transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no route to node {0}")]
    UnknownPeer(NodeId),
    #[error("sender for node {0} has shut down")]
    Closed(NodeId),
    #[error("timed out connecting to {0}")]
    Timeout(String),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Best-effort delivery of protocol messages to `msg.to`
///
/// `send` only hands the message off; it does not wait for the peer to
/// receive it. Retries and reconnects happen behind the call.
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    async fn send(&self, msg: Message) -> Result<(), TransportError>;
}
