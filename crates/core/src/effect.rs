// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects requested by the node state machine

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Side effects that handlers request
///
/// Handlers mutate [`NodeState`](crate::NodeState) and return effects; the
/// runtime executes them in order after releasing the node lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver a message; loopback messages go straight back into the router
    Send(Message),
    /// Append an audit record for the critical section
    Record(CsEvent),
    /// Wake the requester blocked in csEnter so it re-checks its predicate
    WakeRequester,
}

impl Effect {
    /// The message carried by a `Send`, if any
    pub fn message(&self) -> Option<&Message> {
        match self {
            Effect::Send(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Critical section boundary recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CsEvent {
    Enter,
    Exit,
}

impl CsEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            CsEvent::Enter => "ENTER",
            CsEvent::Exit => "EXIT",
        }
    }
}

impl std::fmt::Display for CsEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CsEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENTER" => Ok(CsEvent::Enter),
            "EXIT" => Ok(CsEvent::Exit),
            other => Err(format!("unknown critical section event: {}", other)),
        }
    }
}
