// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable critical section audit trail and the offline exclusion checker

pub mod audit;
pub mod checker;

pub use audit::{AuditEntry, AuditError, AuditSink, FileAuditLog};
pub use checker::{check_dir, check_entries, CheckReport, Violation};

#[cfg(any(test, feature = "test-support"))]
pub use audit::MemoryAuditLog;
