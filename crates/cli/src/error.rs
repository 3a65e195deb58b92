//! Error types for repeater startup.

use thiserror::Error;

/// Fatal startup errors
///
/// Runtime faults (decode errors, failed writes, full queues) never surface
/// here; they are logged and counted where they happen.
#[derive(Error, Debug)]
pub enum RepeaterError {
    /// A target could not be resolved or its socket could not be opened
    #[error("Failed to start senders: {0}")]
    Dispatcher(#[from] dispatcher::DispatcherError),

    /// A listen port could not be bound
    #[error("Failed to start receivers: {0}")]
    Ingestion(#[from] ingestion::IngestionError),

    /// Metrics exporter could not be installed
    #[error("Failed to start metrics endpoint: {0}")]
    Metrics(#[source] anyhow::Error),
}

/// Result type alias for repeater operations
pub type Result<T> = std::result::Result<T, RepeaterError>;
