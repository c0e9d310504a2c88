// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound message dispatch

use crate::effect::Effect;
use crate::message::{Message, MessageKind};
use crate::state::NodeState;
use tracing::{debug, warn};

/// Dispatch an inbound message to its handler.
///
/// Malformed or misaddressed messages are logged and dropped; no error ever
/// crosses back to the caller.
pub fn route(state: &mut NodeState, msg: Message) -> Vec<Effect> {
    if msg.to != state.id() {
        warn!(%msg, node = %state.id(), "discarding message addressed to another node");
        return Vec::new();
    }
    debug!(kind = %msg.kind, from = %msg.from, "routing message");

    match msg.kind {
        MessageKind::Request => match msg.request {
            Some(request) if request.node_id == msg.from => state.on_request(request),
            Some(request) => {
                warn!(from = %msg.from, %request, "discarding request on behalf of another node");
                Vec::new()
            }
            None => {
                warn!(from = %msg.from, "discarding request without payload");
                Vec::new()
            }
        },
        MessageKind::Locked => state.on_locked(msg.from, msg.request),
        MessageKind::Failed => state.on_failed(msg.from, msg.request),
        MessageKind::Inquire => state.on_inquire(msg),
        MessageKind::Relinquish => state.on_relinquish(msg.from, msg.request),
        MessageKind::Release => state.on_release(msg.from, msg.request),
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
