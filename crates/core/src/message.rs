// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol message envelope

use crate::id::NodeId;
use crate::request::Request;
use serde::{Deserialize, Serialize};

/// The six protocol message kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// Ask a quorum member for its grant
    Request,
    /// Grant from a quorum member
    Locked,
    /// Quorum member is granted to a request of equal or higher priority
    Failed,
    /// Coordinator asks its current holder to yield
    Inquire,
    /// Holder yields a grant back to the coordinator
    Relinquish,
    /// Holder is done with the critical section
    Release,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Request => "REQUEST",
            MessageKind::Locked => "LOCKED",
            MessageKind::Failed => "FAILED",
            MessageKind::Inquire => "INQUIRE",
            MessageKind::Relinquish => "RELINQUISH",
            MessageKind::Release => "RELEASE",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message exchanged between two nodes
///
/// Only REQUEST requires a payload. Replies carry the request they refer to
/// as advisory bookkeeping; handlers address replies by `from`/`to`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub from: NodeId,
    pub to: NodeId,
    #[serde(rename = "payload", default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
}

impl Message {
    pub fn new(kind: MessageKind, from: NodeId, to: NodeId) -> Self {
        Self {
            kind,
            from,
            to,
            request: None,
        }
    }

    /// A REQUEST carrying `request`
    pub fn request(from: NodeId, to: NodeId, request: Request) -> Self {
        Self::new(MessageKind::Request, from, to).with_request(request)
    }

    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    /// True if this message is addressed to its own sender
    pub fn is_loopback(&self) -> bool {
        self.from == self.to
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} -> {}", self.kind, self.from, self.to)?;
        if let Some(request) = &self.request {
            write!(f, " {}", request)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
