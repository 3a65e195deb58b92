//! `run` command implementation.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Repeater, RepeaterConfig};

/// Execute the `run` command
pub async fn run_repeater(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        listen_host = %blueprint.listen_host,
        listen_ports = ?blueprint.listen_ports,
        targets = blueprint.targets.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let mut config = RepeaterConfig::new(blueprint);
    config.metrics_port = if args.metrics_port == 0 {
        None
    } else {
        Some(args.metrics_port)
    };

    let repeater = Repeater::new(config);

    // Setup graceful shutdown handler
    tokio::spawn(cancel_on_signal(repeater.shutdown_token()));

    info!("Starting repeater...");

    let stats = repeater.run().await.context("Repeater failed to start")?;
    stats.print_summary();

    info!("OSC Repeater finished");
    Ok(())
}

/// Cancel `token` on Ctrl+C or SIGTERM
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = token.cancelled() => return,
    }

    warn!("Received shutdown signal, stopping repeater...");
    token.cancel();
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RepeaterBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Listeners ({}):", blueprint.listen_ports.len());
    for port in &blueprint.listen_ports {
        println!("  - {}:{}", blueprint.listen_host, port);
    }
    println!("\nTargets ({}):", blueprint.targets.len());
    for target in &blueprint.targets {
        println!("  - {}", target);
    }
    println!("\nQueues:");
    println!("  Intake capacity: {}", blueprint.intake_capacity);
    println!("  Sender capacity: {}", blueprint.sender_queue_capacity);
    println!();
}
