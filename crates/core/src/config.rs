// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster configuration
//!
//! Two on-disk formats are accepted:
//!
//! - TOML, for files ending in `.toml`
//! - the legacy whitespace format: a header line `n delay_ms cs_ms requests`,
//!   then `n` lines of `id host port`, then `n` quorum lines listing member
//!   ids for each node in declaration order. Lines that do not start with a
//!   digit are skipped.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating a cluster configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("line {line}: {message}")]
    Legacy { line: usize, message: String },
    #[error("cluster has no nodes")]
    NoNodes,
    #[error("node {0} is declared more than once")]
    DuplicateNode(NodeId),
    #[error("node {0} has an empty quorum")]
    EmptyQuorum(NodeId),
    #[error("quorum of node {node} names unknown node {member}")]
    UnknownMember { node: NodeId, member: NodeId },
    #[error("quorums of nodes {0} and {1} do not intersect")]
    DisjointQuorums(NodeId, NodeId),
    #[error("node {0} is not in the cluster")]
    UnknownNode(NodeId),
}

/// Workload timing shared by every node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Mean of the exponential delay between two requests
    #[serde(with = "humantime_serde")]
    pub mean_inter_request_delay: Duration,
    /// Mean of the exponential time spent inside the critical section
    #[serde(with = "humantime_serde")]
    pub mean_cs_execution: Duration,
    pub requests_per_node: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            mean_inter_request_delay: Duration::from_millis(20),
            mean_cs_execution: Duration::from_millis(10),
            requests_per_node: 10,
        }
    }
}

/// One node of the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub id: NodeId,
    pub host: String,
    pub port: u16,
    pub quorum: BTreeSet<NodeId>,
}

impl NodeConfig {
    /// `host:port` for dialing or binding
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Static description of the whole cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

impl ClusterConfig {
    /// Load a configuration file, picking the format from its extension.
    /// The result is not validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&content)
        } else {
            Self::from_legacy(&content)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_legacy(content: &str) -> Result<Self, ConfigError> {
        let mut config = ClusterConfig::default();
        let mut expected: Option<usize> = None;
        let mut quorum_lines = 0;

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if !line.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            let tokens: Vec<&str> = line
                .split('#')
                .next()
                .unwrap_or_default()
                .split_whitespace()
                .collect();

            let Some(n) = expected else {
                let [n, delay, cs, requests, ..] = tokens[..] else {
                    return Err(legacy(line_no, "header needs `n delay_ms cs_ms requests`"));
                };
                let n: usize = parse_field(line_no, "node count", n)?;
                config.timing = TimingConfig {
                    mean_inter_request_delay: Duration::from_millis(parse_field(
                        line_no, "delay", delay,
                    )?),
                    mean_cs_execution: Duration::from_millis(parse_field(line_no, "cs time", cs)?),
                    requests_per_node: parse_field(line_no, "request count", requests)?,
                };
                expected = Some(n);
                continue;
            };

            if config.nodes.len() < n {
                let [id, host, port, ..] = tokens[..] else {
                    return Err(legacy(line_no, "node line needs `id host port`"));
                };
                config.nodes.push(NodeConfig {
                    id: parse_field(line_no, "node id", id)?,
                    host: host.to_string(),
                    port: parse_field(line_no, "port", port)?,
                    quorum: BTreeSet::new(),
                });
            } else if quorum_lines < n {
                let quorum = tokens
                    .iter()
                    .map(|t| parse_field(line_no, "quorum member", t))
                    .collect::<Result<BTreeSet<NodeId>, _>>()?;
                config.nodes[quorum_lines].quorum = quorum;
                quorum_lines += 1;
            }
        }

        match expected {
            None => Err(ConfigError::NoNodes),
            Some(n) if config.nodes.len() < n => Err(legacy(
                content.lines().count(),
                &format!("expected {} node lines, found {}", n, config.nodes.len()),
            )),
            Some(n) if quorum_lines < n => Err(legacy(
                content.lines().count(),
                &format!("expected {} quorum lines, found {}", n, quorum_lines),
            )),
            Some(_) => Ok(config),
        }
    }

    /// Check the cluster is usable for mutual exclusion: unique ids, non-empty
    /// quorums of known nodes, and every two quorums sharing a member.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }

        let mut ids = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id) {
                return Err(ConfigError::DuplicateNode(node.id));
            }
        }

        for node in &self.nodes {
            if node.quorum.is_empty() {
                return Err(ConfigError::EmptyQuorum(node.id));
            }
            if let Some(&member) = node.quorum.iter().find(|m| !ids.contains(*m)) {
                return Err(ConfigError::UnknownMember {
                    node: node.id,
                    member,
                });
            }
        }

        for (i, a) in self.nodes.iter().enumerate() {
            for b in &self.nodes[i + 1..] {
                if a.quorum.is_disjoint(&b.quorum) {
                    return Err(ConfigError::DisjointQuorums(a.id, b.id));
                }
            }
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeConfig> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Like [`node`](Self::node) but fails for ids outside the cluster
    pub fn require_node(&self, id: NodeId) -> Result<&NodeConfig, ConfigError> {
        self.node(id).ok_or(ConfigError::UnknownNode(id))
    }

    /// Every node other than `id`
    pub fn peers(&self, id: NodeId) -> impl Iterator<Item = &NodeConfig> {
        self.nodes.iter().filter(move |n| n.id != id)
    }
}

fn legacy(line: usize, message: &str) -> ConfigError {
    ConfigError::Legacy {
        line,
        message: message.to_string(),
    }
}

fn parse_field<T: std::str::FromStr>(line: usize, what: &str, token: &str) -> Result<T, ConfigError> {
    token
        .parse()
        .map_err(|_| legacy(line, &format!("invalid {}: {:?}", what, token)))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
