// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Peer listener and connection handling.

use mkw_adapters::protocol::{self, ProtocolError};
use mkw_adapters::Transport;
use mkw_engine::NodeRuntime;
use mkw_storage::AuditSink;
use tokio::io::AsyncRead;
use tokio::net::TcpListener;
use tracing::{debug, error, warn};

/// Accept peer connections forever, one reader task per connection
pub async fn accept_loop<T, A>(listener: TcpListener, runtime: NodeRuntime<T, A>)
where
    T: Transport,
    A: AuditSink,
{
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "peer connected");
                if let Err(e) = stream.set_nodelay(true) {
                    warn!(%peer, error = %e, "failed to set TCP_NODELAY");
                }
                let runtime = runtime.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(&runtime, stream).await {
                        error!(%peer, "error handling connection: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("error accepting connection: {}", e);
            }
        }
    }
}

/// Read frames until the peer disconnects, delivering each to the node
pub async fn handle_connection<T, A, R>(
    runtime: &NodeRuntime<T, A>,
    mut reader: R,
) -> Result<(), ServerError>
where
    T: Transport,
    A: AuditSink,
    R: AsyncRead + Unpin,
{
    loop {
        match protocol::read_frame(&mut reader).await {
            Ok(msg) => runtime.deliver(msg).await,
            Err(ProtocolError::ConnectionClosed) => {
                debug!("peer disconnected");
                return Ok(());
            }
            Err(ProtocolError::Json(e)) => {
                // Framing is intact, so the connection survives a bad message
                warn!(error = %e, "discarding unrecognized message");
            }
            Err(e) => return Err(ServerError::Protocol(e)),
        }
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
