//! # Ingestion
//!
//! Listener side of the repeater.
//!
//! Responsibilities:
//! - Bind one UDP endpoint per configured listen port (fatal on failure)
//! - Decode every datagram into OSC messages
//! - Forward every decoded message, whatever its address, to one callback
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::ListenerSet;
//!
//! let listeners = ListenerSet::bind_all("0.0.0.0", &[8000, 8001], &shutdown, span).await?;
//! let handle = distributor.handle();
//! listeners.start_all(Arc::new(move |msg| {
//!     handle.send(msg);
//! }));
//! ```

mod error;
mod listener;
mod metrics;
mod pipeline;

// Re-exports
pub use contracts::{Message, MessageCallback, MessageSource};
pub use error::{IngestionError, Result};
pub use listener::UdpListener;
pub use metrics::{ListenerMetrics, MetricsSnapshot};
pub use pipeline::ListenerSet;
