//! Repeater metrics
//!
//! `record_*` helpers push events into the `metrics` facade; `RepeaterSummary`
//! aggregates per-component snapshots for the shutdown report.

use metrics::{counter, gauge};

/// Record one message decoded by a listener
pub fn record_message_received(listener: &str) {
    counter!(
        "osc_repeater_messages_received_total",
        "listener" => listener.to_string()
    )
    .increment(1);
}

/// Record one datagram a listener could not decode
pub fn record_decode_error(listener: &str) {
    counter!(
        "osc_repeater_decode_errors_total",
        "listener" => listener.to_string()
    )
    .increment(1);
}

/// Record a message dropped at the Distributor intake
pub fn record_intake_dropped() {
    counter!("osc_repeater_intake_dropped_total").increment(1);
}

/// Record a message dropped because a target queue was full
pub fn record_sender_dropped(target: &str) {
    counter!(
        "osc_repeater_sender_dropped_total",
        "target" => target.to_string()
    )
    .increment(1);
}

/// Record one transport write to a target
pub fn record_message_sent(target: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "osc_repeater_messages_sent_total",
        "target" => target.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    if !success {
        counter!(
            "osc_repeater_send_failures_total",
            "target" => target.to_string()
        )
        .increment(1);
    }
}

/// Record the current depth of a target queue
pub fn record_queue_depth(target: &str, depth: usize) {
    gauge!(
        "osc_repeater_queue_depth",
        "target" => target.to_string()
    )
    .set(depth as f64);
}

/// Delivery counters for one target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetStats {
    pub target: String,
    pub sent: u64,
    pub failed: u64,
    pub dropped: u64,
}

impl TargetStats {
    /// Percentage of offered messages that were dropped
    pub fn drop_rate(&self) -> f64 {
        let offered = self.sent + self.failed + self.dropped;
        if offered > 0 {
            self.dropped as f64 / offered as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Whole-process summary, built at shutdown
#[derive(Debug, Clone, Default)]
pub struct RepeaterSummary {
    pub received: u64,
    pub decode_errors: u64,
    pub intake_accepted: u64,
    pub intake_dropped: u64,
    pub targets: Vec<TargetStats>,
}

impl RepeaterSummary {
    /// Percentage of received messages dropped at the intake
    pub fn intake_drop_rate(&self) -> f64 {
        let offered = self.intake_accepted + self.intake_dropped;
        if offered > 0 {
            self.intake_dropped as f64 / offered as f64 * 100.0
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for RepeaterSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Repeater Summary ===")?;
        writeln!(f, "Received: {}", self.received)?;
        writeln!(f, "Decode errors: {}", self.decode_errors)?;
        writeln!(
            f,
            "Intake: {} accepted, {} dropped ({:.2}%)",
            self.intake_accepted,
            self.intake_dropped,
            self.intake_drop_rate()
        )?;

        for stats in &self.targets {
            writeln!(
                f,
                "  {}: sent={} failed={} dropped={} ({:.2}%)",
                stats.target,
                stats.sent,
                stats.failed,
                stats.dropped,
                stats.drop_rate()
            )?;
        }

        Ok(())
    }
}
