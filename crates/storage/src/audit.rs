// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit log of critical section entries and exits
//!
//! One line per record: `<unix_millis> -> Node: <id> => ENTER|EXIT`.

use mkw_core::{CsEvent, NodeId};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors that can occur in audit log operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A single audit record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp_ms: u64,
    pub node: NodeId,
    pub event: CsEvent,
}

impl AuditEntry {
    /// Stamp `event` with the current wall clock time
    pub fn now(node: NodeId, event: CsEvent) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            timestamp_ms,
            node,
            event,
        }
    }

    /// Parse one log line; anything that is not an audit record yields `None`
    pub fn parse(line: &str) -> Option<Self> {
        let (timestamp, rest) = line.trim().split_once("->")?;
        let rest = rest.trim_start().strip_prefix("Node:")?;
        let (node, event) = rest.split_once("=>")?;
        Some(Self {
            timestamp_ms: timestamp.trim().parse().ok()?,
            node: node.parse().ok()?,
            event: event.trim().parse().ok()?,
        })
    }
}

impl std::fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> Node: {} => {}",
            self.timestamp_ms, self.node, self.event
        )
    }
}

/// Destination for audit records
pub trait AuditSink: Send + Sync + 'static {
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// Audit log backed by an append-only file, flushed after every record
pub struct FileAuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileAuditLog {
    /// File name used for `node`'s log inside an output directory
    pub fn file_name(node: NodeId) -> String {
        format!("node-{}.log", node)
    }

    /// Open or create `node`'s log under `dir`
    pub fn open_in(dir: &Path, node: NodeId) -> Result<Self, AuditError> {
        std::fs::create_dir_all(dir)?;
        Self::open(&dir.join(Self::file_name(node)))
    }

    /// Open or create a log at the given path
    pub fn open(path: &Path) -> Result<Self, AuditError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every audit record in a log file. A missing file reads as empty;
    /// lines that are not audit records are skipped.
    pub fn read(path: &Path) -> Result<Vec<AuditEntry>, AuditError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            if let Some(entry) = AuditEntry::parse(&line?) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

impl AuditSink for FileAuditLog {
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(file, "{}", entry)?;
        file.flush()?;
        Ok(())
    }
}

/// In-memory audit log for tests
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Default)]
pub struct MemoryAuditLog {
    entries: std::sync::Arc<Mutex<Vec<AuditEntry>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records written so far
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn events(&self) -> Vec<(NodeId, CsEvent)> {
        self.entries().iter().map(|e| (e.node, e.event)).collect()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl AuditSink for MemoryAuditLog {
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(*entry);
        Ok(())
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
