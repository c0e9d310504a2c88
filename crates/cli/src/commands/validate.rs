// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mkw validate`: load a cluster config and check its quorums

use super::load_cluster;
use crate::output::{self, join, OutputFormat};
use anyhow::Result;
use mkw_core::ClusterConfig;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Cluster config (`.toml`, or the legacy text format)
    pub config: PathBuf,
}

/// A validated cluster, printable as text or JSON
#[derive(Serialize)]
struct Validated {
    valid: bool,
    #[serde(flatten)]
    cluster: ClusterConfig,
}

impl fmt::Display for Validated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timing = &self.cluster.timing;
        writeln!(f, "cluster config OK: {} nodes", self.cluster.nodes.len())?;
        writeln!(
            f,
            "timing: mean inter-request delay {:?}, mean cs execution {:?}, {} requests per node",
            timing.mean_inter_request_delay, timing.mean_cs_execution, timing.requests_per_node
        )?;
        for (i, node) in self.cluster.nodes.iter().enumerate() {
            write!(f, "node {} {} quorum {{{}}}", node.id, node.addr(), join(&node.quorum))?;
            if i + 1 < self.cluster.nodes.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

pub fn handle(args: ValidateArgs, format: OutputFormat) -> Result<()> {
    let cluster = load_cluster(&args.config)?;
    output::print(
        &Validated {
            valid: true,
            cluster,
        },
        format,
    );
    Ok(())
}
