// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mkw - quorum mutual exclusion cluster tools

mod commands;
mod completions;
mod error;
mod output;

use clap::{Parser, Subcommand};
use commands::{check, quorum, validate};
use std::process::ExitCode;

use crate::completions::CompletionsArgs;
use crate::error::MkwError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "mkw",
    version,
    about = "Quorum mutual exclusion - cluster config and audit log tools"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a cluster config: node ids, quorum members, quorum intersection
    Validate(validate::ValidateArgs),
    /// Verify mutual exclusion from a directory of node audit logs
    Check(check::CheckArgs),
    /// Show a node's quorum and the nodes it coordinates for
    Quorum(quorum::QuorumArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate(args) => validate::handle(args, cli.output),
        Commands::Check(args) => check::handle(args, cli.output),
        Commands::Quorum(args) => quorum::handle(args, cli.output),
        Commands::Completions(args) => {
            completions::generate_completions::<Cli>(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<MkwError>() {
                Some(err) => eprint!("{}", err),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr, quiet unless `MKW_LOG` asks for more
fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("MKW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
