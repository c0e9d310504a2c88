// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mkw-core: quorum mutual exclusion state machines
//!
//! This crate provides:
//! - Request priority ordering over a Lamport clock
//! - The message envelope exchanged between nodes
//! - Pure per-node state with coordinator and requester handlers that return effects
//! - The message router dispatching inbound messages to those handlers
//! - Cluster configuration loading and quorum validation

pub mod clock;
pub mod config;
pub mod effect;
pub mod id;
pub mod message;
pub mod request;
pub mod router;

// State machine (order matters for dependencies)
pub mod state;
pub mod coordinator;
pub mod requester;

pub use clock::LamportClock;
pub use config::{ClusterConfig, ConfigError, NodeConfig, TimingConfig};
pub use coordinator::Coordinator;
pub use effect::{CsEvent, Effect};
pub use id::NodeId;
pub use message::{Message, MessageKind};
pub use request::Request;
pub use router::route;
pub use state::{NodeState, Role};
