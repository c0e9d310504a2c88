// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod check;
pub mod quorum;
pub mod validate;

use crate::error::MkwError;
use mkw_core::ClusterConfig;
use std::path::Path;

/// Load and validate a cluster config, with a friendly error
pub fn load_cluster(path: &Path) -> Result<ClusterConfig, MkwError> {
    let cluster = ClusterConfig::load(path).map_err(|e| MkwError::invalid_config(path, e))?;
    cluster
        .validate()
        .map_err(|e| MkwError::invalid_config(path, e))?;
    Ok(cluster)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
