//! Message - one decoded OSC datagram, shared read-only by every consumer

use std::fmt;
use std::sync::Arc;

use rosc::{OscMessage, OscType};

/// Immutable OSC message
///
/// Cloning is a reference-count bump, so the Distributor can hand one copy
/// to every Target Sender without touching the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Message(Arc<OscMessage>);

impl Message {
    /// Wrap a decoded OSC message
    pub fn new(inner: OscMessage) -> Self {
        Self(Arc::new(inner))
    }

    /// Build a message from an address pattern and argument list
    pub fn from_parts(addr: impl Into<String>, args: Vec<OscType>) -> Self {
        Self::new(OscMessage {
            addr: addr.into(),
            args,
        })
    }

    /// Address pattern
    pub fn addr(&self) -> &str {
        &self.0.addr
    }

    /// Typed argument list
    pub fn args(&self) -> &[OscType] {
        &self.0.args
    }

    /// Borrow the underlying OSC message
    pub fn as_osc(&self) -> &OscMessage {
        &self.0
    }
}

impl From<OscMessage> for Message {
    fn from(inner: OscMessage) -> Self {
        Self::new(inner)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr())?;
        for arg in self.args() {
            write!(f, " {:?}", arg)?;
        }
        Ok(())
    }
}
