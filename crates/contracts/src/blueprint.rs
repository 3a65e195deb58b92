//! RepeaterBlueprint - Config Loader output
//!
//! Describes the fixed topology: which ports to listen on and which targets
//! receive every repeated message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete repeater configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeaterBlueprint {
    /// Local UDP ports to bind listeners on
    #[serde(alias = "listenPorts")]
    pub listen_ports: Vec<u16>,

    /// Target endpoints as "host:port"
    pub targets: Vec<String>,

    /// Interface the listeners bind on
    #[serde(default = "default_listen_host", alias = "listenHost")]
    pub listen_host: String,

    /// Per-target queue capacity
    #[serde(default = "default_queue_capacity", alias = "senderQueueCapacity")]
    pub sender_queue_capacity: usize,

    /// Distributor intake queue capacity
    #[serde(default = "default_queue_capacity", alias = "intakeCapacity")]
    pub intake_capacity: usize,
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_queue_capacity() -> usize {
    100
}

impl RepeaterBlueprint {
    /// Blueprint with default host and capacities
    pub fn new(listen_ports: Vec<u16>, targets: Vec<String>) -> Self {
        Self {
            listen_ports,
            targets,
            listen_host: default_listen_host(),
            sender_queue_capacity: default_queue_capacity(),
            intake_capacity: default_queue_capacity(),
        }
    }

    /// Parsed targets, in configuration order
    pub fn parsed_targets(&self) -> Result<Vec<Target>, String> {
        self.targets.iter().map(|t| Target::parse(t)).collect()
    }
}

/// One configured destination endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse "host:port"; IPv6 hosts may be bracketed ("[::1]:9000")
    pub fn parse(s: &str) -> Result<Self, String> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("'{s}' is not in host:port form"))?;

        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(format!("'{s}' has an empty host"));
        }

        let port: u16 = port
            .parse()
            .map_err(|e| format!("'{s}' has an invalid port: {e}"))?;
        if port == 0 {
            return Err(format!("'{s}' has port 0"));
        }

        Ok(Self::new(host, port))
    }

    /// String form suitable for `lookup_host`
    pub fn lookup_string(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lookup_string())
    }
}
