//! Ingestion error types

use std::net::SocketAddr;

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Listener could not bind its endpoint (fatal at startup)
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        /// Requested endpoint
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Listen address could not be formed
    #[error("invalid listen address '{addr}': {message}")]
    InvalidAddress {
        /// Address as configured
        addr: String,
        /// Error message
        message: String,
    },
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
