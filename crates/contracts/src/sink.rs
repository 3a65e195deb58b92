//! MessageSink trait - Target Sender output interface
//!
//! Defines the transport a Target Sender writes to.

use crate::{ContractError, Message};

/// Outbound transport trait
///
/// One sink per target. Writes happen one at a time from the sender's worker.
#[trait_variant::make(MessageSink: Send)]
pub trait LocalMessageSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one message to the target
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, message: &Message) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
