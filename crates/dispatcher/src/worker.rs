//! Shared worker lifecycle flag

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::WorkerState;

/// Observable Running/Stopped flag for one worker task
///
/// Starts `Running`; the worker flips it to `Stopped` exactly once on exit.
#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    stopped: Arc<AtomicBool>,
}

impl WorkerStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WorkerState {
        if self.stopped.load(Ordering::Acquire) {
            WorkerState::Stopped
        } else {
            WorkerState::Running
        }
    }

    pub(crate) fn mark_stopped(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}
