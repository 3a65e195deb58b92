//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::RepeaterBlueprint;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    listen_host: String,
    listen_ports: Vec<u16>,
    targets: Vec<String>,
    sender_queue_capacity: usize,
    intake_capacity: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    listen_host: blueprint.listen_host.clone(),
                    listen_ports: blueprint.listen_ports.clone(),
                    targets: blueprint.targets.clone(),
                    sender_queue_capacity: blueprint.sender_queue_capacity,
                    intake_capacity: blueprint.intake_capacity,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &RepeaterBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    // A target that is also one of our own listeners repeats forever
    if let Ok(targets) = blueprint.parsed_targets() {
        for target in &targets {
            let local = matches!(
                target.host.as_str(),
                "127.0.0.1" | "localhost" | "::1" | "0.0.0.0"
            ) || target.host == blueprint.listen_host;
            if local && blueprint.listen_ports.contains(&target.port) {
                warnings.push(format!(
                    "Target '{}' points at a local listen port - messages will loop",
                    target
                ));
            }
        }
    }

    // Duplicate targets receive every message twice
    let mut seen = std::collections::HashSet::new();
    for target in &blueprint.targets {
        if !seen.insert(target.as_str()) {
            warnings.push(format!("Target '{}' is listed more than once", target));
        }
    }

    if blueprint.intake_capacity < blueprint.sender_queue_capacity {
        warnings.push(format!(
            "intake_capacity ({}) is smaller than sender_queue_capacity ({}) - bursts will drop at the intake",
            blueprint.intake_capacity, blueprint.sender_queue_capacity
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Listen host: {}", summary.listen_host);
            println!("  Listen ports: {:?}", summary.listen_ports);
            println!("  Targets: {}", summary.targets.join(", "));
            println!("  Intake capacity: {}", summary.intake_capacity);
            println!("  Sender capacity: {}", summary.sender_queue_capacity);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
