// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: arguments, startup, shutdown.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use mkw_adapters::{RetryPolicy, TcpTransport, TracedTransport};
use mkw_core::{ClusterConfig, ConfigError, NodeId, NodeState};
use mkw_engine::NodeRuntime;
use mkw_storage::{AuditError, FileAuditLog};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

/// Node runtime with concrete adapter types (wrapped with tracing)
pub type DaemonRuntime = NodeRuntime<TracedTransport<TcpTransport>, FileAuditLog>;

/// Daemon configuration, from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub node: NodeId,
    /// Cluster description (`.toml` or the legacy text format)
    pub cluster_path: PathBuf,
    /// Directory for the audit log and the daemon log
    pub output_dir: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
}

impl Config {
    /// Parse `<node-id> <config> [output-dir]` (program name excluded)
    pub fn from_args<I, S>(args: I) -> Result<Self, LifecycleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let (node, cluster_path, output_dir) = match args.as_slice() {
            [node, cluster] => (node, cluster, "."),
            [node, cluster, output] => (node, cluster, output.as_str()),
            _ => return Err(LifecycleError::Usage),
        };
        let node: NodeId = node
            .parse()
            .map_err(|_| LifecycleError::InvalidNodeId(node.clone()))?;
        let output_dir = PathBuf::from(output_dir);

        Ok(Self {
            node,
            cluster_path: PathBuf::from(cluster_path),
            log_path: output_dir.join(format!("mkwd-{}.log", node)),
            output_dir,
        })
    }
}

/// Errors that stop the daemon from starting
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("usage: mkwd <node-id> <config> [output-dir]")]
    Usage,

    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {0}: {1}")]
    BindFailed(String, std::io::Error),

    #[error("audit log error: {0}")]
    Audit(#[from] AuditError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon state during operation
pub struct DaemonState {
    pub cluster: ClusterConfig,
    /// Peer listener
    pub listener: TcpListener,
    pub runtime: DaemonRuntime,
    pub start_time: Instant,
}

/// Log the node's final protocol state before exit
pub fn log_shutdown(runtime: &DaemonRuntime, start_time: Instant) {
    let state = runtime.snapshot();
    info!(
        uptime_secs = start_time.elapsed().as_secs(),
        in_cs = state.in_cs(),
        holder = ?state.coordinator().held_by(),
        waiting = state.coordinator().queue_len(),
        "shutting down"
    );
}

/// Load the cluster, open the audit log, bind the node's port and start the
/// transport. Must run inside a tokio runtime.
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    let cluster = ClusterConfig::load(&config.cluster_path)?;
    cluster.validate()?;
    let node = cluster.require_node(config.node)?;

    std::fs::create_dir_all(&config.output_dir)?;
    let audit = FileAuditLog::open_in(&config.output_dir, config.node)?;

    let bind_addr = node.addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| LifecycleError::BindFailed(bind_addr.clone(), e))?;

    let transport = TcpTransport::spawn(
        cluster.peers(config.node).map(|peer| (peer.id, peer.addr())),
        RetryPolicy::from_env(),
    );
    let state = NodeState::new(config.node, node.quorum.iter().copied());
    let runtime = NodeRuntime::new(state, TracedTransport::new(transport), audit);

    info!(
        node = %config.node,
        addr = %bind_addr,
        quorum = ?node.quorum,
        peers = cluster.nodes.len() - 1,
        "node started"
    );

    Ok(DaemonState {
        cluster,
        listener,
        runtime,
        start_time: Instant::now(),
    })
}

/// Per-attempt deadline for the workload, if `MKW_ENTER_TIMEOUT_MS` is set
pub fn enter_timeout() -> Option<Duration> {
    std::env::var("MKW_ENTER_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
