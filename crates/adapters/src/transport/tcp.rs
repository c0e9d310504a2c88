// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP transport with one outbound queue per peer

use super::{Transport, TransportError};
use crate::protocol;
use async_trait::async_trait;
use mkw_core::{Message, NodeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Reconnect schedule for a peer connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Connection attempts per message before it is dropped
    pub max_attempts: u32,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            max_attempts: 10,
            connect_timeout: Duration::from_secs(2),
            write_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Defaults overridden by `MKW_RETRY_*` / `MKW_TIMEOUT_*` env vars
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            initial_delay: parse_duration_ms("MKW_RETRY_INITIAL_MS")
                .unwrap_or(defaults.initial_delay),
            max_delay: parse_duration_ms("MKW_RETRY_MAX_MS").unwrap_or(defaults.max_delay),
            max_attempts: std::env::var("MKW_RETRY_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
            connect_timeout: parse_duration_ms("MKW_TIMEOUT_CONNECT_MS")
                .unwrap_or(defaults.connect_timeout),
            write_timeout: parse_duration_ms("MKW_TIMEOUT_WRITE_MS")
                .unwrap_or(defaults.write_timeout),
        }
    }

    /// Sleep before retry number `attempt` (zero-based), doubling up to the cap
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Sends messages over TCP, preserving per-peer send order
///
/// Each peer gets a background task owning its connection. Messages to the
/// same peer are written in the order `send` was called.
#[derive(Clone)]
pub struct TcpTransport {
    peers: Arc<HashMap<NodeId, mpsc::UnboundedSender<Message>>>,
}

impl TcpTransport {
    /// Start one sender task per `(node, address)`. Must be called inside a
    /// tokio runtime.
    pub fn spawn(peers: impl IntoIterator<Item = (NodeId, String)>, policy: RetryPolicy) -> Self {
        let mut senders = HashMap::new();
        for (node, addr) in peers {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(run_peer(node, addr, rx, policy.clone()));
            senders.insert(node, tx);
        }
        Self {
            peers: Arc::new(senders),
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, msg: Message) -> Result<(), TransportError> {
        let to = msg.to;
        let tx = self.peers.get(&to).ok_or(TransportError::UnknownPeer(to))?;
        tx.send(msg).map_err(|_| TransportError::Closed(to))
    }
}

async fn run_peer(
    node: NodeId,
    addr: String,
    mut rx: mpsc::UnboundedReceiver<Message>,
    policy: RetryPolicy,
) {
    let mut conn: Option<TcpStream> = None;
    while let Some(msg) = rx.recv().await {
        if let Err(e) = deliver(&mut conn, &addr, &msg, &policy).await {
            tracing::warn!(
                peer = %node,
                addr,
                kind = %msg.kind,
                attempts = policy.max_attempts,
                error = %e,
                "dropping message after retries"
            );
        }
    }
    tracing::debug!(peer = %node, "peer sender stopped");
}

/// Write `msg`, reconnecting with backoff until the attempts run out
async fn deliver(
    conn: &mut Option<TcpStream>,
    addr: &str,
    msg: &Message,
    policy: &RetryPolicy,
) -> Result<(), TransportError> {
    let mut attempt = 0;
    loop {
        let result = match conn.take() {
            Some(stream) => Ok(stream),
            None => connect(addr, policy.connect_timeout).await,
        };
        let err = match result {
            Ok(mut stream) => {
                match protocol::write_frame(&mut stream, msg, policy.write_timeout).await {
                    Ok(()) => {
                        *conn = Some(stream);
                        return Ok(());
                    }
                    Err(e) => TransportError::from(e),
                }
            }
            Err(e) => e,
        };

        attempt += 1;
        if attempt >= policy.max_attempts {
            return Err(err);
        }
        let delay = policy.delay_for(attempt - 1);
        tracing::debug!(addr, attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying");
        tokio::time::sleep(delay).await;
    }
}

async fn connect(addr: &str, timeout: Duration) -> Result<TcpStream, TransportError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| TransportError::Timeout(addr.to_string()))??;
    stream.set_nodelay(true)?;
    Ok(stream)
}

#[cfg(test)]
#[path = "tcp_tests.rs"]
mod tests;
