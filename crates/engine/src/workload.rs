// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synthetic critical section workload

use crate::runtime::NodeRuntime;
use mkw_adapters::Transport;
use mkw_core::TimingConfig;
use mkw_storage::AuditSink;
use rand::Rng;
use std::time::Duration;

/// Draw from an exponential distribution with the given mean
///
/// Uses `-mean * ln(u)` with `u` in `(0, 1]`, so the result is finite.
pub fn sample_exponential<R: Rng>(rng: &mut R, mean: Duration) -> Duration {
    let u: f64 = 1.0 - rng.gen::<f64>();
    mean.mul_f64(-u.ln())
}

/// Outcome of a workload run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkloadReport {
    pub completed: u32,
    pub skipped: u32,
}

/// Repeatedly enter and leave the critical section with random pauses
#[derive(Debug, Clone)]
pub struct Workload {
    timing: TimingConfig,
    /// Give up on an attempt after this long and move to the next one
    enter_timeout: Option<Duration>,
}

impl Workload {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            enter_timeout: None,
        }
    }

    pub fn with_enter_timeout(mut self, timeout: Duration) -> Self {
        self.enter_timeout = Some(timeout);
        self
    }

    pub async fn run<T, A, R>(&self, runtime: &NodeRuntime<T, A>, rng: &mut R) -> WorkloadReport
    where
        T: Transport,
        A: AuditSink,
        R: Rng + Send,
    {
        let mut report = WorkloadReport::default();
        for iteration in 0..self.timing.requests_per_node {
            tokio::time::sleep(sample_exponential(rng, self.timing.mean_inter_request_delay)).await;

            let entered = match self.enter_timeout {
                Some(timeout) => runtime.cs_enter_within(timeout).await,
                None => runtime.cs_enter().await,
            };
            if let Err(e) = entered {
                tracing::warn!(iteration, error = %e, "skipping iteration");
                // Withdraw the outstanding attempt so its grants are freed
                if let Err(e) = runtime.cs_leave().await {
                    tracing::debug!(error = %e, "nothing to withdraw");
                }
                report.skipped += 1;
                continue;
            }

            tokio::time::sleep(sample_exponential(rng, self.timing.mean_cs_execution)).await;

            if let Err(e) = runtime.cs_leave().await {
                tracing::warn!(iteration, error = %e, "leave failed");
            }
            report.completed += 1;
        }
        tracing::info!(
            completed = report.completed,
            skipped = report.skipped,
            "workload finished"
        );
        report
    }
}

#[cfg(test)]
#[path = "workload_tests.rs"]
mod tests;
