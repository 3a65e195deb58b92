//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// OSC Repeater - fan inbound OSC messages out to a fixed set of targets
#[derive(Parser, Debug)]
#[command(
    name = "osc-repeater",
    author,
    version,
    about = "Best-effort OSC message repeater",
    long_about = "Listens for OSC messages on one or more UDP ports and repeats every \n\
                  message, unmodified, to each configured target. Slow or unreachable \n\
                  targets lose messages instead of delaying the others."
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, env = "OSC_REPEATER_DEBUG")]
    pub debug: bool,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "OSC_REPEATER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Arguments for the default `run` command
    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The command to execute; `run` when none is given
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Run(self.run))
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the repeater (default)
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Send a single test message
    Send(SendArgs),
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "OSC_REPEATER_CONFIG"
    )]
    pub config: PathBuf,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "OSC_REPEATER_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without starting the repeater
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `send` command
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Destination host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Destination port
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// OSC address pattern
    #[arg(long, default_value = "/test")]
    pub address: String,

    /// Integer argument carried by the message
    #[arg(long, default_value = "101", allow_negative_numbers = true)]
    pub arg: i32,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
