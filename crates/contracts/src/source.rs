//! MessageSource trait - inbound adapter abstraction
//!
//! A source decodes whatever arrives on its endpoint and hands every message
//! to one registered callback. There is no routing table.

use std::sync::Arc;

use crate::Message;

/// Forwarding callback type
///
/// Invoked once per decoded message, from the source's receive task.
/// Must not block.
pub type MessageCallback = Arc<dyn Fn(Message) + Send + Sync>;

/// Inbound message source trait
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn MessageSource> = bind_listener().await?;
/// source.listen(Arc::new(|msg| distributor.send(msg)));
/// // ...
/// source.stop();
/// ```
pub trait MessageSource: Send + Sync {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Register the catch-all callback and start receiving
    ///
    /// Repeated calls are idempotent: only the first callback is registered.
    fn listen(&self, callback: MessageCallback);

    /// Stop receiving
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
