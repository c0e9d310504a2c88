// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lamport logical clock

use serde::{Deserialize, Serialize};

/// A monotonically non-decreasing logical clock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LamportClock {
    value: u64,
}

impl LamportClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at a given value
    pub fn starting_at(value: u64) -> Self {
        Self { value }
    }

    /// Current value
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Advance for a local event and return the new value
    pub fn tick(&mut self) -> u64 {
        self.value += 1;
        self.value
    }

    /// Merge a timestamp observed on an inbound request: `max(local, seen) + 1`
    pub fn observe(&mut self, seen: u64) -> u64 {
        self.value = self.value.max(seen) + 1;
        self.value
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
