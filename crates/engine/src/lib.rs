// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mkw-engine: drives a node's protocol state against real I/O

mod error;
mod executor;
mod runtime;
mod workload;

pub use error::EngineError;
pub use executor::Executor;
pub use runtime::NodeRuntime;
pub use workload::{sample_exponential, Workload, WorkloadReport};
