//! Configuration parsing
//!
//! Supports TOML (primary), JSON, and YAML.

use contracts::{ContractError, RepeaterBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
    /// YAML (`listenPorts` / `targets` style files)
    Yaml,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<RepeaterBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<RepeaterBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse YAML configuration
pub fn parse_yaml(content: &str) -> Result<RepeaterBlueprint, ContractError> {
    serde_yaml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("YAML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<RepeaterBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
        ConfigFormat::Yaml => parse_yaml(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
listen_ports = [8000, 8001]
targets = ["127.0.0.1:9000", "10.0.0.5:9000"]
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.listen_ports, vec![8000, 8001]);
        assert_eq!(bp.targets.len(), 2);
        assert_eq!(bp.sender_queue_capacity, 100);
    }

    #[test]
    fn test_parse_toml_camel_case_keys() {
        let content = r#"
listenPorts = [8000]
targets = ["127.0.0.1:9000"]
senderQueueCapacity = 16
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.listen_ports, vec![8000]);
        assert_eq!(bp.sender_queue_capacity, 16);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "listen_ports": [8000],
            "targets": ["127.0.0.1:9000"],
            "listen_host": "127.0.0.1",
            "intake_capacity": 32
        }"#;
        let bp = parse_json(content).unwrap();
        assert_eq!(bp.listen_host, "127.0.0.1");
        assert_eq!(bp.intake_capacity, 32);
    }

    #[test]
    fn test_parse_yaml_camel_case_keys() {
        let content = "listenPorts:\n  - 8000\n  - 8001\ntargets:\n  - 127.0.0.1:9000\n";
        let bp = parse_yaml(content).unwrap();
        assert_eq!(bp.listen_ports, vec![8000, 8001]);
        assert_eq!(bp.targets, vec!["127.0.0.1:9000"]);
        assert_eq!(bp.listen_host, "0.0.0.0");
    }

    #[test]
    fn test_parse_yaml_syntax_error() {
        let result = parse_yaml("listenPorts: [8000\ntargets: ");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_missing_targets() {
        let result = parse_toml("listen_ports = [8000]");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(
            ConfigFormat::from_extension("yaml"),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_extension("yml"),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(ConfigFormat::from_extension("ini"), None);
    }
}
