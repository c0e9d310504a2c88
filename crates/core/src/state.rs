// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-node protocol state
//!
//! One `NodeState` exists per process and lives as long as the process. It is
//! owned by the runtime behind a single mutex; the coordinator and requester
//! handlers (see [`coordinator`](crate::coordinator) and
//! [`requester`](crate::requester)) are methods on it so that cross-field
//! invariants are always updated together.

use crate::clock::LamportClock;
use crate::coordinator::Coordinator;
use crate::id::NodeId;
use crate::message::{Message, MessageKind};
use crate::request::Request;
use std::collections::{BTreeMap, BTreeSet};

/// This node's own critical section attempt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Role {
    /// Not interested in the critical section
    #[default]
    Released,
    /// REQUESTs sent, collecting LOCKED replies
    Requesting,
    /// Executing the critical section
    Exec,
}

/// Protocol state for a single node
#[derive(Clone, Debug)]
pub struct NodeState {
    pub(crate) id: NodeId,
    pub(crate) quorum: BTreeSet<NodeId>,
    pub(crate) clock: LamportClock,
    pub(crate) role: Role,
    /// The request of the current attempt, if any
    pub(crate) current: Option<Request>,
    /// Replies collected for the current attempt, keyed by quorum member
    pub(crate) replies: BTreeMap<NodeId, MessageKind>,
    /// INQUIREs not yet answered, keyed by inquirer
    pub(crate) deferred_inquiries: BTreeMap<NodeId, Message>,
    pub(crate) in_cs: bool,
    pub(crate) coordinator: Coordinator,
}

impl NodeState {
    pub fn new(id: NodeId, quorum: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            id,
            quorum: quorum.into_iter().collect(),
            clock: LamportClock::new(),
            role: Role::Released,
            current: None,
            replies: BTreeMap::new(),
            deferred_inquiries: BTreeMap::new(),
            in_cs: false,
            coordinator: Coordinator::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn quorum(&self) -> &BTreeSet<NodeId> {
        &self.quorum
    }

    pub fn clock(&self) -> u64 {
        self.clock.value()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn in_cs(&self) -> bool {
        self.in_cs
    }

    /// Request of the attempt in progress
    pub fn current_request(&self) -> Option<Request> {
        self.current
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn reply_from(&self, member: NodeId) -> Option<MessageKind> {
        self.replies.get(&member).copied()
    }

    pub fn replies(&self) -> &BTreeMap<NodeId, MessageKind> {
        &self.replies
    }

    pub fn deferred_inquiries(&self) -> &BTreeMap<NodeId, Message> {
        &self.deferred_inquiries
    }

    pub fn locked_count(&self) -> usize {
        self.count_replies(MessageKind::Locked)
    }

    pub fn failed_count(&self) -> usize {
        self.count_replies(MessageKind::Failed)
    }

    fn count_replies(&self, kind: MessageKind) -> usize {
        self.replies.values().filter(|k| **k == kind).count()
    }

    /// Every quorum member has granted the current attempt
    pub fn quorum_reached(&self) -> bool {
        self.role == Role::Requesting && self.locked_count() >= self.quorum.len()
    }

    /// Build a reply from this node, carrying `about` as advisory payload
    pub(crate) fn reply(&self, kind: MessageKind, to: NodeId, about: Option<Request>) -> Message {
        let msg = Message::new(kind, self.id, to);
        match about {
            Some(request) => msg.with_request(request),
            None => msg,
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
