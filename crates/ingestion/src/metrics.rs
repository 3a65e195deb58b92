//! Listener metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-listener counters
#[derive(Debug, Default)]
pub struct ListenerMetrics {
    /// Datagrams read from the socket
    pub datagrams_received: AtomicU64,

    /// Messages decoded and forwarded
    pub messages_received: AtomicU64,

    /// Datagrams that failed to decode
    pub decode_errors: AtomicU64,
}

impl ListenerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_datagram(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub datagrams_received: u64,
    pub messages_received: u64,
    pub decode_errors: u64,
}

impl std::ops::Add for MetricsSnapshot {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            datagrams_received: self.datagrams_received + rhs.datagrams_received,
            messages_received: self.messages_received + rhs.messages_received,
            decode_errors: self.decode_errors + rhs.decode_errors,
        }
    }
}
