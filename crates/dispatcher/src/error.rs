//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Only raised at construction; a running Distributor never returns errors.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Target could not be parsed or resolved
    #[error("failed to resolve target '{target}': {message}")]
    TargetResolve { target: String, message: String },

    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Error from a contract type
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a target resolution error
    pub fn target_resolve(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TargetResolve {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
