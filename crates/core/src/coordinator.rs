// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quorum coordinator: this node granting its lock to other requesters
//!
//! A coordinator grants at most one request at a time. Competing requests
//! wait in a queue ordered by request priority. When a request with higher
//! priority than the current grant reaches the head of the queue, the holder
//! is asked to yield (INQUIRE); a holder that yields (RELINQUISH) is put back
//! in the queue and the queue head is granted instead.

use crate::effect::Effect;
use crate::id::NodeId;
use crate::message::MessageKind;
use crate::request::Request;
use crate::state::NodeState;
use std::collections::BTreeSet;
use tracing::debug;

/// Grant bookkeeping for the local lock
///
/// Invariant: `held_by` is never also present in `wait_queue`, and the queue
/// holds at most one request per node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coordinator {
    held_by: Option<Request>,
    wait_queue: BTreeSet<Request>,
}

impl Coordinator {
    /// The request currently granted the lock
    pub fn held_by(&self) -> Option<Request> {
        self.held_by
    }

    pub fn is_locked(&self) -> bool {
        self.held_by.is_some()
    }

    /// Waiting requests, highest priority first
    pub fn waiting(&self) -> impl Iterator<Item = &Request> {
        self.wait_queue.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.wait_queue.len()
    }

    fn head(&self) -> Option<Request> {
        self.wait_queue.first().copied()
    }

    /// The grant or queued request belonging to `node`, if any
    fn live_request_from(&self, node: NodeId) -> Option<Request> {
        self.held_by
            .filter(|r| r.node_id == node)
            .or_else(|| self.wait_queue.iter().find(|r| r.node_id == node).copied())
    }

    /// Grant the highest priority waiting request, if any
    fn grant_next(&mut self) -> Option<Request> {
        self.held_by = self.wait_queue.pop_first();
        self.held_by
    }
}

impl NodeState {
    /// Handle a REQUEST from `incoming.node_id`
    pub fn on_request(&mut self, incoming: Request) -> Vec<Effect> {
        self.clock.observe(incoming.seqnum);
        let mut effects = Vec::new();

        // At most one live request per node: drop duplicates and stale
        // retransmissions, let a newer attempt replace an older one.
        if let Some(live) = self.coordinator.live_request_from(incoming.node_id) {
            if live.seqnum >= incoming.seqnum {
                debug!(request = %incoming, live = %live, "ignoring duplicate or stale request");
                return effects;
            }
            if self.coordinator.held_by == Some(live) {
                debug!(request = %incoming, replaces = %live, "holder renewed its request");
                self.coordinator.held_by = Some(incoming);
                effects.push(self.send(MessageKind::Locked, incoming.node_id, incoming));
                // The renewed grant ranks lower; any INQUIRE for the old one
                // is now ignored by the holder, so ask again.
                if let Some(head) = self.coordinator.head().filter(|h| h.precedes(&incoming)) {
                    debug!(request = %incoming, waiting = %head, "renewed grant outranked, inquiring");
                    effects.push(self.send(MessageKind::Inquire, incoming.node_id, incoming));
                }
                return effects;
            }
            self.coordinator.wait_queue.remove(&live);
        }

        let Some(held) = self.coordinator.held_by else {
            debug!(request = %incoming, "unlocked, granting");
            self.coordinator.held_by = Some(incoming);
            effects.push(self.send(MessageKind::Locked, incoming.node_id, incoming));
            return effects;
        };

        self.coordinator.wait_queue.insert(incoming);

        if incoming.precedes(&held) && self.coordinator.head() == Some(incoming) {
            debug!(request = %incoming, holder = %held, "higher priority request at head, inquiring");
            effects.push(self.send(MessageKind::Inquire, held.node_id, held));
        } else {
            debug!(request = %incoming, holder = %held, "request queued behind higher priority");
        }
        effects.push(self.send(MessageKind::Failed, incoming.node_id, incoming));

        effects
    }

    /// Handle a RELINQUISH: the holder `from` yields its grant
    pub fn on_relinquish(&mut self, from: NodeId, about: Option<Request>) -> Vec<Effect> {
        let Some(held) = self.holder_matching(from, about) else {
            debug!(%from, holder = ?self.coordinator.held_by, "ignoring stale relinquish");
            return Vec::new();
        };

        self.coordinator.held_by = None;
        self.coordinator.wait_queue.insert(held);
        self.grant_waiting()
    }

    /// Handle a RELEASE: the holder `from` left the critical section
    pub fn on_release(&mut self, from: NodeId, about: Option<Request>) -> Vec<Effect> {
        if self.holder_matching(from, about).is_none() {
            debug!(%from, holder = ?self.coordinator.held_by, "ignoring stale release");
            return Vec::new();
        }

        self.coordinator.held_by = None;
        self.grant_waiting()
    }

    /// The current grant, if it belongs to `from` and to the attempt named
    /// by `about` (when given)
    fn holder_matching(&self, from: NodeId, about: Option<Request>) -> Option<Request> {
        self.coordinator
            .held_by
            .filter(|held| held.node_id == from && about.is_none_or(|r| r == *held))
    }

    fn grant_waiting(&mut self) -> Vec<Effect> {
        match self.coordinator.grant_next() {
            Some(next) => {
                debug!(request = %next, "granting next waiting request");
                vec![self.send(MessageKind::Locked, next.node_id, next)]
            }
            None => {
                debug!("no waiting requests, unlocked");
                Vec::new()
            }
        }
    }

    fn send(&self, kind: MessageKind, to: NodeId, about: Request) -> Effect {
        Effect::Send(self.reply(kind, to, Some(about)))
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
