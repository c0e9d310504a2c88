// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Critical section requests and their priority order

use crate::id::NodeId;
use serde::{Deserialize, Serialize};

/// A request to enter the critical section
///
/// Requests are totally ordered by `(seqnum, node_id)` lexicographically.
/// Lower sorts first and has higher priority. The ordering is the only
/// tie-break used anywhere in the protocol: every coordinator must apply the
/// identical comparison for mutual exclusion to hold.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Lamport clock value when the request was made
    pub seqnum: u64,
    /// Requesting node
    pub node_id: NodeId,
}

impl Request {
    pub fn new(seqnum: u64, node_id: impl Into<NodeId>) -> Self {
        Self {
            seqnum,
            node_id: node_id.into(),
        }
    }

    /// True if this request has strictly higher priority than `other`
    pub fn precedes(&self, other: &Request) -> bool {
        self < other
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(seq: {}, node: {})", self.seqnum, self.node_id)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
