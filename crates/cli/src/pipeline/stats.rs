//! Repeater run statistics.

use std::time::Duration;

use dispatcher::{IntakeSnapshot, MetricsSnapshot};
use observability::{RepeaterSummary, TargetStats};

/// Statistics from one repeater run
#[derive(Debug, Clone, Default)]
pub struct RepeaterStats {
    /// Wall time between startup and shutdown
    pub duration: Duration,

    /// Number of bound listeners
    pub listeners: usize,

    /// Counters gathered from every component
    pub summary: RepeaterSummary,
}

impl RepeaterStats {
    /// Assemble from component snapshots
    pub fn collect(
        duration: Duration,
        listeners: usize,
        received: ingestion::MetricsSnapshot,
        intake: IntakeSnapshot,
        senders: Vec<(String, MetricsSnapshot)>,
    ) -> Self {
        let targets = senders
            .into_iter()
            .map(|(target, m)| TargetStats {
                target,
                sent: m.write_count,
                failed: m.failure_count,
                dropped: m.dropped_count,
            })
            .collect();

        Self {
            duration,
            listeners,
            summary: RepeaterSummary {
                received: received.messages_received,
                decode_errors: received.decode_errors,
                intake_accepted: intake.accepted,
                intake_dropped: intake.dropped,
                targets,
            },
        }
    }

    /// Received messages per second
    pub fn rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.summary.received as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!();
        print!("{}", self.summary);
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Listeners: {}", self.listeners);
        println!("Rate: {:.2} msg/s", self.rate());
        println!();
    }
}
