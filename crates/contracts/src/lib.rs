//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the repeater.
//! Business crates only depend on this crate, never on each other's internals.
//!
//! ## Data Model
//! - `Message`: one decoded OSC message, immutable and cheaply cloned
//! - `Target`: a fixed (host, port) destination
//! - `RepeaterBlueprint`: the configuration that fixes listeners and targets

mod blueprint;
pub mod codec;
mod error;
mod message;
mod runtime;
mod sink;
mod source;

pub use blueprint::*;
pub use error::*;
pub use message::Message;
pub use rosc::OscType;
pub use runtime::WorkerState;
pub use sink::*;
pub use source::{MessageCallback, MessageSource};
