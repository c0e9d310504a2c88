// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.

use mkw_core::ConfigError;
use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct MkwError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl MkwError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    /// Add context about why this error might have happened.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    /// Add a suggestion for how to fix this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Set the source error that caused this error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for MkwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for MkwError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Common error builders for typical failure scenarios.
impl MkwError {
    /// A cluster config that failed to load or validate
    pub fn invalid_config(path: &Path, error: ConfigError) -> Self {
        let err = MkwError::new(format!("invalid cluster config {}", path.display()))
            .with_context(error.to_string());
        let err = match &error {
            ConfigError::Io { .. } => err.with_suggestion("Check the path and file permissions"),
            ConfigError::Toml(_) | ConfigError::Legacy { .. } => err
                .with_suggestion("Files ending in .toml are read as TOML, anything else as the legacy text format"),
            ConfigError::NoNodes => err.with_suggestion("Declare at least one node"),
            ConfigError::DuplicateNode(_) => err.with_suggestion("Give every node a distinct id"),
            ConfigError::EmptyQuorum(node) | ConfigError::UnknownMember { node, .. } => err
                .with_suggestion(format!("Fix the quorum of node {}; members must be declared nodes", node)),
            ConfigError::DisjointQuorums(a, b) => err
                .with_context("Disjoint quorums let both nodes enter the critical section at once")
                .with_suggestion(format!("Add a node shared by the quorums of {} and {}", a, b)),
            ConfigError::UnknownNode(_) => err,
        };
        err.with_source(error)
    }

    /// Audit logs showed overlapping critical sections
    pub fn exclusion_violated(count: usize, dir: &Path) -> Self {
        MkwError::new(format!("{} mutual exclusion violation(s)", count))
            .with_context(format!("Audit logs under {}", dir.display()))
            .with_suggestion("Check that every node was started from the same cluster config")
    }
}
