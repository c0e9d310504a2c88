// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mkw check`: replay audit logs and look for overlapping critical sections

use crate::error::MkwError;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use mkw_core::NodeId;
use mkw_storage::CheckReport;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Directory holding the `node-<id>.log` audit files
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Serialize)]
struct ViolationView {
    timestamp_ms: u64,
    node: NodeId,
    active: Vec<NodeId>,
}

#[derive(Serialize)]
struct UnmatchedExitView {
    timestamp_ms: u64,
    node: NodeId,
}

/// Serializable mirror of the checker's report
#[derive(Serialize)]
struct CheckView {
    ok: bool,
    files: Vec<PathBuf>,
    entries: usize,
    violations: Vec<ViolationView>,
    unmatched_exits: Vec<UnmatchedExitView>,
    still_inside: Vec<NodeId>,
    #[serde(skip)]
    report: CheckReport,
}

impl From<CheckReport> for CheckView {
    fn from(report: CheckReport) -> Self {
        Self {
            ok: report.is_ok(),
            files: report.files.clone(),
            entries: report.entries,
            violations: report
                .violations
                .iter()
                .map(|v| ViolationView {
                    timestamp_ms: v.timestamp_ms,
                    node: v.node,
                    active: v.active.clone(),
                })
                .collect(),
            unmatched_exits: report
                .unmatched_exits
                .iter()
                .map(|e| UnmatchedExitView {
                    timestamp_ms: e.timestamp_ms,
                    node: e.node,
                })
                .collect(),
            still_inside: report.still_inside.clone(),
            report,
        }
    }
}

impl fmt::Display for CheckView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.report, f)
    }
}

pub fn handle(args: CheckArgs, format: OutputFormat) -> Result<()> {
    let report = mkw_storage::check_dir(&args.dir)
        .with_context(|| format!("failed to read audit logs in {}", args.dir.display()))?;
    if report.files.is_empty() {
        return Err(MkwError::new(format!("no audit logs in {}", args.dir.display()))
            .with_context("Expected files named node-<id>.log")
            .with_suggestion("Pass the output directory the nodes were started with")
            .into());
    }

    let violations = report.violations.len();
    output::print(&CheckView::from(report), format);

    if violations > 0 {
        return Err(MkwError::exclusion_violated(violations, &args.dir).into());
    }
    Ok(())
}
