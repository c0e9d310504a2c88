// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the node runtime

use thiserror::Error;

/// Misuse of the critical section API, or an expired wait
///
/// Protocol anomalies never surface here; they are logged and dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("timed out after {0:?} waiting for the quorum")]
    TimedOut(std::time::Duration),
    #[error("already in the critical section")]
    AlreadyInCriticalSection,
    #[error("no critical section attempt to leave")]
    NotRequesting,
}
