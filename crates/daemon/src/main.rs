// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quorum mutual exclusion node daemon (mkwd)
//!
//! Serves coordinator duties for its peers and runs the configured
//! critical section workload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;
mod server;

use std::io::Write;

use mkw_engine::Workload;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::lifecycle::{Config, DaemonState, LifecycleError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    // Write startup marker to log (before tracing setup)
    write_startup_marker(&config)?;

    // Set up logging
    let log_guard = setup_logging(&config)?;

    info!(
        node = %config.node,
        "Starting mkwd with cluster {}",
        config.cluster_path.display()
    );

    let DaemonState {
        cluster,
        listener,
        runtime,
        start_time,
    } = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start node: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let server = tokio::spawn(server::accept_loop(listener, runtime.clone()));

    // Signal ready for the parent process
    println!("READY");
    std::io::stdout().flush()?;

    let mut workload = Workload::new(cluster.timing);
    if let Some(timeout) = lifecycle::enter_timeout() {
        workload = workload.with_enter_timeout(timeout);
    }
    let workload_runtime = runtime.clone();
    let mut workload_task = tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        workload.run(&workload_runtime, &mut rng).await
    });
    let mut workload_done = false;

    // Keep serving coordinator duties after the workload finishes
    loop {
        tokio::select! {
            result = &mut workload_task, if !workload_done => {
                workload_done = true;
                match result {
                    Ok(report) => info!(
                        node = %config.node,
                        completed = report.completed,
                        skipped = report.skipped,
                        "Workload done, still serving peers"
                    ),
                    Err(e) => error!("Workload task failed: {}", e),
                }
            }

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    server.abort();
    workload_task.abort();
    lifecycle::log_shutdown(&runtime, start_time);
    info!("Node stopped");
    drop(log_guard);
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- mkwd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- mkwd: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    std::fs::create_dir_all(&config.output_dir)?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start node: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(
        &config.output_dir,
        format!("mkwd-{}.log", config.node),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(guard)
}
