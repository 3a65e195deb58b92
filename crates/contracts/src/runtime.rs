//! Worker lifecycle state

use std::fmt;

/// State of a Distributor or Target Sender worker loop
///
/// `Running` from spawn until the shared cancellation token fires, then
/// `Stopped` for good. There is no pause or drain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Stopped => f.write_str("stopped"),
        }
    }
}
