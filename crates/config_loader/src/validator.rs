//! Configuration validation
//!
//! Rules:
//! - at least one listen port, each non-zero and unique
//! - listen_host not empty
//! - at least one target, each in host:port form
//! - queue capacities >= 1

use std::collections::HashSet;

use contracts::{ContractError, RepeaterBlueprint, Target};

/// Validate a RepeaterBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RepeaterBlueprint) -> Result<(), ContractError> {
    validate_listen_ports(blueprint)?;
    validate_listen_host(blueprint)?;
    validate_targets(blueprint)?;
    validate_capacities(blueprint)?;
    Ok(())
}

fn validate_listen_ports(blueprint: &RepeaterBlueprint) -> Result<(), ContractError> {
    if blueprint.listen_ports.is_empty() {
        return Err(ContractError::config_validation(
            "listen_ports",
            "at least one listen port is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, port) in blueprint.listen_ports.iter().enumerate() {
        if *port == 0 {
            return Err(ContractError::config_validation(
                format!("listen_ports[{idx}]"),
                "port must be non-zero",
            ));
        }
        if !seen.insert(port) {
            return Err(ContractError::config_validation(
                format!("listen_ports[{idx}]"),
                format!("duplicate listen port {port}"),
            ));
        }
    }
    Ok(())
}

fn validate_listen_host(blueprint: &RepeaterBlueprint) -> Result<(), ContractError> {
    if blueprint.listen_host.trim().is_empty() {
        return Err(ContractError::config_validation(
            "listen_host",
            "listen host cannot be empty",
        ));
    }
    Ok(())
}

fn validate_targets(blueprint: &RepeaterBlueprint) -> Result<(), ContractError> {
    if blueprint.targets.is_empty() {
        return Err(ContractError::config_validation(
            "targets",
            "at least one target is required",
        ));
    }

    for (idx, target) in blueprint.targets.iter().enumerate() {
        Target::parse(target)
            .map_err(|e| ContractError::config_validation(format!("targets[{idx}]"), e))?;
    }
    Ok(())
}

fn validate_capacities(blueprint: &RepeaterBlueprint) -> Result<(), ContractError> {
    if blueprint.sender_queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "sender_queue_capacity",
            "queue capacity must be >= 1",
        ));
    }
    if blueprint.intake_capacity == 0 {
        return Err(ContractError::config_validation(
            "intake_capacity",
            "intake capacity must be >= 1",
        ));
    }
    Ok(())
}
