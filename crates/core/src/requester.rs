// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requester side: this node pursuing its own critical section
//!
//! The blocking part of csEnter lives in the runtime; these are the state
//! transitions it drives plus the handlers for replies to our own request.

use crate::effect::{CsEvent, Effect};
use crate::id::NodeId;
use crate::message::{Message, MessageKind};
use crate::request::Request;
use crate::state::{NodeState, Role};
use tracing::debug;

impl NodeState {
    /// Start a new attempt: tick the clock, reset per-attempt bookkeeping and
    /// address a REQUEST to every quorum member (self included).
    pub fn begin_request(&mut self) -> (Request, Vec<Effect>) {
        self.role = Role::Requesting;
        let request = Request::new(self.clock.tick(), self.id);
        self.current = Some(request);
        self.replies.clear();
        self.deferred_inquiries.clear();

        let effects = self
            .quorum
            .iter()
            .map(|&member| Effect::Send(Message::request(self.id, member, request)))
            .collect();
        (request, effects)
    }

    /// Enter the critical section once the quorum is reached
    pub fn enter(&mut self) -> Vec<Effect> {
        self.role = Role::Exec;
        self.in_cs = true;
        vec![Effect::Record(CsEvent::Enter)]
    }

    /// Leave the critical section (or abandon an attempt) and release every
    /// quorum member. The EXIT record, if any, precedes the RELEASEs.
    pub fn leave(&mut self) -> Vec<Effect> {
        let released = self.current.take();
        let mut effects = Vec::new();
        if self.in_cs {
            effects.push(Effect::Record(CsEvent::Exit));
        }
        self.in_cs = false;
        self.role = Role::Released;
        self.replies.clear();
        self.deferred_inquiries.clear();

        effects.extend(self.quorum.iter().map(|&member| {
            Effect::Send(self.reply(MessageKind::Release, member, released))
        }));
        effects
    }

    /// Handle a LOCKED grant from quorum member `from`
    pub fn on_locked(&mut self, from: NodeId, about: Option<Request>) -> Vec<Effect> {
        if self.is_other_attempt(about) {
            // The coordinator still holds a grant for an attempt we gave up on
            debug!(%from, request = ?about, "returning grant for an earlier attempt");
            return vec![Effect::Send(self.reply(MessageKind::Release, from, about))];
        }
        if !self.accepts_reply(MessageKind::Locked, from, about) {
            return Vec::new();
        }
        self.replies.insert(from, MessageKind::Locked);
        debug!(%from, locked = self.locked_count(), quorum = self.quorum.len(), "grant received");

        // An INQUIRE may have overtaken this grant; answer it now that we hold it.
        let mut effects = self.yield_deferred();
        if self.locked_count() >= self.quorum.len() {
            effects.push(Effect::WakeRequester);
        }
        effects
    }

    /// Handle a FAILED reply from quorum member `from`
    pub fn on_failed(&mut self, from: NodeId, about: Option<Request>) -> Vec<Effect> {
        if !self.accepts_reply(MessageKind::Failed, from, about) {
            return Vec::new();
        }
        if self.reply_from(from) == Some(MessageKind::Locked) {
            debug!(%from, "ignoring stale failed, already granted");
            return Vec::new();
        }
        self.replies.insert(from, MessageKind::Failed);

        let mut effects = self.yield_deferred();
        effects.push(Effect::WakeRequester);
        effects
    }

    /// Handle an INQUIRE: coordinator `msg.from` asks us to yield its grant
    pub fn on_inquire(&mut self, msg: Message) -> Vec<Effect> {
        let from = msg.from;
        if self.is_other_attempt(msg.request) {
            debug!(%from, "ignoring inquire for an earlier attempt");
            return Vec::new();
        }
        self.deferred_inquiries.insert(from, msg);

        if self.in_cs {
            debug!(%from, "in critical section, deferring inquire");
            return Vec::new();
        }
        if self.failed_count() == 0 {
            debug!(%from, "no failed replies yet, deferring inquire");
            return Vec::new();
        }
        if self.reply_from(from) != Some(MessageKind::Locked) {
            debug!(%from, "grant not received yet, deferring inquire");
            return Vec::new();
        }

        vec![self.relinquish(from)]
    }

    /// Yield every grant with a pending INQUIRE, provided we are not in the
    /// critical section and at least one member has refused us.
    fn yield_deferred(&mut self) -> Vec<Effect> {
        if self.in_cs || self.failed_count() == 0 {
            return Vec::new();
        }
        let inquirers: Vec<NodeId> = self
            .deferred_inquiries
            .keys()
            .filter(|n| self.replies.get(*n) == Some(&MessageKind::Locked))
            .copied()
            .collect();

        inquirers.into_iter().map(|n| self.relinquish(n)).collect()
    }

    /// Yield the grant from `to`. Until it grants again, `to` counts as
    /// refusing us, so later INQUIREs are still answered.
    fn relinquish(&mut self, to: NodeId) -> Effect {
        self.deferred_inquiries.remove(&to);
        self.replies.insert(to, MessageKind::Failed);
        debug!(%to, "relinquishing grant");
        Effect::Send(self.reply(MessageKind::Relinquish, to, self.current))
    }

    fn accepts_reply(&self, kind: MessageKind, from: NodeId, about: Option<Request>) -> bool {
        if self.role != Role::Requesting {
            debug!(%from, %kind, role = ?self.role, "ignoring reply outside a request");
            return false;
        }
        if !self.quorum.contains(&from) {
            debug!(%from, %kind, "ignoring reply from outside the quorum");
            return false;
        }
        if self.is_other_attempt(about) {
            debug!(%from, %kind, "ignoring reply for an earlier attempt");
            return false;
        }
        true
    }

    /// The advisory payload names one of our requests other than the current one
    fn is_other_attempt(&self, about: Option<Request>) -> bool {
        about.is_some_and(|r| r.node_id == self.id && Some(r) != self.current)
    }
}

#[cfg(test)]
#[path = "requester_tests.rs"]
mod tests;
