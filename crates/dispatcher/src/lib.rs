//! # Dispatcher
//!
//! Fan-out core of the repeater.
//!
//! Responsibilities:
//! - Accept messages from any number of listeners without ever blocking them
//! - Fan each accepted message out to every Target Sender, in fixed order
//! - Isolate slow or unreachable targets behind bounded drop-newest queues
//! - Stop every worker on one shared cancellation token

pub mod distributor;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod sender;
pub mod sinks;
mod worker;

#[cfg(test)]
mod testing;

pub use contracts::{Message, MessageSink, WorkerState};
pub use distributor::{
    resolve_target, Distributor, DistributorBuilder, DistributorConfig, DistributorHandle,
};
pub use error::DispatcherError;
pub use metrics::{IntakeSnapshot, MetricsSnapshot, SenderMetrics};
pub use sender::{TargetSender, DEFAULT_SENDER_CAPACITY};
pub use sinks::UdpSink;
pub use tokio_util::sync::CancellationToken;
pub use worker::WorkerStatus;
