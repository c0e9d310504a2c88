// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Offline mutual exclusion check over a directory of audit logs

use crate::audit::{AuditEntry, AuditError, FileAuditLog};
use mkw_core::{CsEvent, NodeId};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A node entered while others were still inside
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub timestamp_ms: u64,
    pub node: NodeId,
    pub active: Vec<NodeId>,
}

/// Outcome of replaying the merged audit trail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Log files that were read, in name order
    pub files: Vec<PathBuf>,
    pub entries: usize,
    pub violations: Vec<Violation>,
    /// EXIT records from nodes not recorded as inside
    pub unmatched_exits: Vec<AuditEntry>,
    /// Nodes still inside when the logs end
    pub still_inside: Vec<NodeId>,
}

impl CheckReport {
    /// True if no two critical sections overlapped
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "checked {} records from {} log files",
            self.entries,
            self.files.len()
        )?;
        for v in &self.violations {
            writeln!(
                f,
                "VIOLATION at {}: node {} entered while {} inside",
                v.timestamp_ms,
                v.node,
                join(&v.active)
            )?;
        }
        for e in &self.unmatched_exits {
            writeln!(
                f,
                "WARNING at {}: node {} exited without entering",
                e.timestamp_ms, e.node
            )?;
        }
        if !self.still_inside.is_empty() {
            writeln!(f, "still inside at end of logs: {}", join(&self.still_inside))?;
        }
        if self.is_ok() {
            write!(f, "mutual exclusion preserved")
        } else {
            write!(f, "mutual exclusion VIOLATED")
        }
    }
}

fn join(ids: &[NodeId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load every `node*.log` under `dir` and check the merged records
pub fn check_dir(dir: &Path) -> Result<CheckReport, AuditError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_audit_log(path))
        .collect();
    files.sort();

    let mut entries = Vec::new();
    for path in &files {
        let read = FileAuditLog::read(path)?;
        tracing::debug!(path = %path.display(), records = read.len(), "loaded audit log");
        entries.extend(read);
    }

    let mut report = check_entries(entries);
    report.files = files;
    Ok(report)
}

fn is_audit_log(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("node") && n.ends_with(".log"))
}

/// Replay records in time order, EXIT before ENTER at equal timestamps
pub fn check_entries(mut entries: Vec<AuditEntry>) -> CheckReport {
    entries.sort_by_key(|e| (e.timestamp_ms, e.event == CsEvent::Enter));

    let mut report = CheckReport {
        entries: entries.len(),
        ..CheckReport::default()
    };
    let mut active = BTreeSet::new();

    for entry in entries {
        match entry.event {
            CsEvent::Enter => {
                if !active.is_empty() {
                    report.violations.push(Violation {
                        timestamp_ms: entry.timestamp_ms,
                        node: entry.node,
                        active: active.iter().copied().collect(),
                    });
                }
                active.insert(entry.node);
            }
            CsEvent::Exit => {
                if !active.remove(&entry.node) {
                    report.unmatched_exits.push(entry);
                }
            }
        }
    }

    report.still_inside = active.into_iter().collect();
    report
}

#[cfg(test)]
#[path = "checker_tests.rs"]
mod tests;
