//! # OSC Repeater CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - Repeater lifecycle (startup, signal handling, bounded shutdown)
//! - A one-shot test message sender

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_repeater, run_send, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let obs_config = observability::ObservabilityConfig {
        log_format: cli.log_format.into(),
        ..Default::default()
    }
    .with_debug(cli.debug, cli.quiet);
    observability::init_with_config(obs_config)?;

    tracing::debug!("Debug mode enabled");
    info!(version = env!("CARGO_PKG_VERSION"), "OSC Repeater starting");

    let result = match cli.into_command() {
        Commands::Run(args) => run_repeater(&args).await,
        Commands::Validate(args) => run_validate(&args),
        Commands::Send(args) => run_send(&args).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
