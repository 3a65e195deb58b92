//! Repeater lifecycle module.

mod orchestrator;
mod stats;

pub use orchestrator::{Repeater, RepeaterConfig, RunningRepeater};
pub use stats::RepeaterStats;
