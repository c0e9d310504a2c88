// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mkw quorum`: who a node asks, and who asks it

use super::load_cluster;
use crate::error::MkwError;
use crate::output::{self, join, OutputFormat};
use anyhow::Result;
use mkw_core::NodeId;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct QuorumArgs {
    /// Cluster config (`.toml`, or the legacy text format)
    pub config: PathBuf,
    /// Node to describe
    pub node: NodeId,
}

#[derive(Serialize)]
struct QuorumView {
    node: NodeId,
    addr: String,
    /// Nodes this node must collect grants from
    quorum: Vec<NodeId>,
    /// Nodes whose quorum includes this node
    coordinates_for: Vec<NodeId>,
}

impl fmt::Display for QuorumView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "node {} ({})", self.node, self.addr)?;
        writeln!(f, "quorum: {}", join(&self.quorum))?;
        write!(f, "coordinates for: {}", join(&self.coordinates_for))
    }
}

pub fn handle(args: QuorumArgs, format: OutputFormat) -> Result<()> {
    let cluster = load_cluster(&args.config)?;
    let node = cluster.require_node(args.node).map_err(|e| {
        MkwError::new(e.to_string())
            .with_context(format!(
                "Declared nodes: {}",
                join(cluster.nodes.iter().map(|n| n.id))
            ))
            .with_source(e)
    })?;

    let view = QuorumView {
        node: node.id,
        addr: node.addr(),
        quorum: node.quorum.iter().copied().collect(),
        coordinates_for: cluster
            .nodes
            .iter()
            .filter(|n| n.quorum.contains(&node.id))
            .map(|n| n.id)
            .collect(),
    };
    output::print(&view, format);
    Ok(())
}
