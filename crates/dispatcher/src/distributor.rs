//! Distributor - central fan-out from listeners to every Target Sender

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, instrument, trace, Instrument, Span};

use contracts::{Message, RepeaterBlueprint, Target, WorkerState};

use crate::error::DispatcherError;
use crate::metrics::{IntakeMetrics, IntakeSnapshot, MetricsSnapshot, SenderMetrics};
use crate::queue::{self, QueueReceiver, QueueSender};
use crate::sender::{TargetSender, DEFAULT_SENDER_CAPACITY};
use crate::sinks::UdpSink;
use crate::worker::WorkerStatus;

/// Distributor configuration
#[derive(Debug, Clone)]
pub struct DistributorConfig {
    /// Targets, in fan-out order
    pub targets: Vec<Target>,
    /// Per-target queue capacity
    pub sender_queue_capacity: usize,
    /// Intake queue capacity
    pub intake_capacity: usize,
}

impl DistributorConfig {
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            targets,
            sender_queue_capacity: DEFAULT_SENDER_CAPACITY,
            intake_capacity: DEFAULT_SENDER_CAPACITY,
        }
    }

    /// Build from a validated blueprint
    pub fn from_blueprint(blueprint: &RepeaterBlueprint) -> Result<Self, DispatcherError> {
        let targets = blueprint
            .parsed_targets()
            .map_err(|e| DispatcherError::target_resolve("targets", e))?;

        Ok(Self {
            targets,
            sender_queue_capacity: blueprint.sender_queue_capacity,
            intake_capacity: blueprint.intake_capacity,
        })
    }
}

/// Builder for creating a Distributor over UDP targets
pub struct DistributorBuilder {
    config: DistributorConfig,
    shutdown: CancellationToken,
    span: Span,
}

impl DistributorBuilder {
    /// Create a new DistributorBuilder
    pub fn new(config: DistributorConfig, shutdown: CancellationToken) -> Self {
        Self {
            config,
            shutdown,
            span: Span::current(),
        }
    }

    /// Parent span for the distributor and its senders
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Resolve targets, connect sinks, start every worker
    ///
    /// Nothing is left running if any target fails.
    #[instrument(
        name = "distributor_builder_build",
        skip(self),
        fields(targets = self.config.targets.len())
    )]
    pub async fn build(self) -> Result<Distributor, DispatcherError> {
        let mut senders = Vec::with_capacity(self.config.targets.len());

        for target in &self.config.targets {
            match self.create_sender(target).await {
                Ok(sender) => senders.push(sender),
                Err(e) => {
                    for sender in senders {
                        sender.shutdown().await;
                    }
                    return Err(e);
                }
            }
        }

        let span = info_span!(parent: &self.span, "distributor");
        Ok(Distributor::spawn(
            senders,
            self.config.intake_capacity,
            &self.shutdown,
            span,
        ))
    }

    async fn create_sender(&self, target: &Target) -> Result<TargetSender, DispatcherError> {
        let addr = resolve_target(target).await?;
        let sink = UdpSink::connect(target.to_string(), addr)
            .await
            .map_err(|e| DispatcherError::sink_creation(target.to_string(), e.to_string()))?;

        info!(target = %target, addr = %addr, "Starting new sender");

        let span = info_span!(parent: &self.span, "target_sender", target = %target);
        Ok(TargetSender::spawn(
            sink,
            self.config.sender_queue_capacity,
            &self.shutdown,
            span,
        ))
    }
}

/// Resolve a target to its first socket address
pub async fn resolve_target(target: &Target) -> Result<SocketAddr, DispatcherError> {
    let mut addrs = tokio::net::lookup_host(target.lookup_string())
        .await
        .map_err(|e| DispatcherError::target_resolve(target.to_string(), e.to_string()))?;

    addrs
        .next()
        .ok_or_else(|| DispatcherError::target_resolve(target.to_string(), "no addresses found"))
}

/// Cloneable, non-blocking entry point into a Distributor
///
/// Listeners each hold one of these.
#[derive(Debug, Clone)]
pub struct DistributorHandle {
    intake: QueueSender<Message>,
    metrics: Arc<IntakeMetrics>,
}

impl DistributorHandle {
    /// Offer one message for fan-out
    ///
    /// Returns immediately. False means the intake was full (or stopped)
    /// and the message was dropped.
    pub fn send(&self, message: Message) -> bool {
        if self.intake.try_enqueue(message) {
            self.metrics.inc_accepted();
            true
        } else if self.intake.is_closed() {
            trace!("Distributor stopped, message dropped");
            false
        } else {
            self.metrics.inc_dropped();
            observability::record_intake_dropped();
            trace!("Intake full, message dropped");
            false
        }
    }
}

/// Read-only view of one sender kept by the Distributor for reporting
#[derive(Debug, Clone)]
struct SenderView {
    name: String,
    metrics: Arc<SenderMetrics>,
    status: WorkerStatus,
}

/// The fan-out hub
pub struct Distributor {
    handle: DistributorHandle,
    senders: Vec<SenderView>,
    status: WorkerStatus,
    stop: CancellationToken,
    worker_handle: JoinHandle<()>,
}

impl Distributor {
    /// Start the distribution loop over a fixed list of senders
    pub fn spawn(
        senders: Vec<TargetSender>,
        intake_capacity: usize,
        shutdown: &CancellationToken,
        span: Span,
    ) -> Self {
        let (intake, rx) = queue::bounded(intake_capacity);
        let metrics = Arc::new(IntakeMetrics::new());
        let status = WorkerStatus::new();
        let stop = shutdown.child_token();

        let views = senders
            .iter()
            .map(|s| SenderView {
                name: s.name().to_string(),
                metrics: Arc::clone(s.metrics()),
                status: s.status().clone(),
            })
            .collect();

        let worker = distributor_worker(
            senders,
            rx,
            stop.clone(),
            Arc::clone(&metrics),
            status.clone(),
        );
        let worker_handle = tokio::spawn(worker.instrument(span));

        Self {
            handle: DistributorHandle { intake, metrics },
            senders: views,
            status,
            stop,
            worker_handle,
        }
    }

    /// Handle for listeners
    pub fn handle(&self) -> DistributorHandle {
        self.handle.clone()
    }

    /// Offer one message for fan-out (non-blocking)
    pub fn send(&self, message: Message) -> bool {
        self.handle.send(message)
    }

    /// Number of Target Senders
    pub fn sender_count(&self) -> usize {
        self.senders.len()
    }

    /// Intake counters
    pub fn intake_metrics(&self) -> IntakeSnapshot {
        self.handle.metrics.snapshot()
    }

    /// Get metrics for all senders, in fan-out order
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.senders
            .iter()
            .map(|s| (s.name.clone(), s.metrics.snapshot()))
            .collect()
    }

    /// Distributor loop state
    pub fn state(&self) -> WorkerState {
        self.status.state()
    }

    /// States of every sender, in fan-out order
    pub fn sender_states(&self) -> Vec<(String, WorkerState)> {
        self.senders
            .iter()
            .map(|s| (s.name.clone(), s.status.state()))
            .collect()
    }

    /// True once the loop and every sender have stopped
    pub fn is_stopped(&self) -> bool {
        self.state() == WorkerState::Stopped
            && self
                .senders
                .iter()
                .all(|s| s.status.state() == WorkerState::Stopped)
    }

    /// Stop without waiting for senders stuck in a write
    ///
    /// The loop task is aborted; senders it owned are dropped and keep no
    /// queue open.
    #[instrument(name = "distributor_abort", skip(self))]
    pub async fn abort(self) {
        self.stop.cancel();
        self.worker_handle.abort();
        if let Err(e) = self.worker_handle.await {
            if e.is_panic() {
                error!(error = ?e, "Distributor task panicked");
            }
        }
        self.status.mark_stopped();
        debug!("Distributor aborted");
    }

    /// Stop the loop and every sender, and wait for them
    #[instrument(name = "distributor_shutdown", skip(self))]
    pub async fn shutdown(self) {
        self.stop.cancel();
        if let Err(e) = self.worker_handle.await {
            error!(error = ?e, "Distributor task panicked");
            self.status.mark_stopped();
        }
        debug!("Distributor shutdown complete");
    }
}

/// Distribution loop: one message at a time, offered to every sender in order
async fn distributor_worker(
    senders: Vec<TargetSender>,
    mut rx: QueueReceiver<Message>,
    stop: CancellationToken,
    metrics: Arc<IntakeMetrics>,
    status: WorkerStatus,
) {
    info!(senders = senders.len(), "Distributor started");

    while let Some(message) = rx.dequeue_or_cancel(&stop).await {
        debug!(msg = %message, "received message");
        metrics.inc_forwarded();

        for sender in &senders {
            sender.send(message.clone());
        }
    }

    // Closes the intake for every handle
    drop(rx);
    status.mark_stopped();
    info!(
        forwarded = metrics.snapshot().forwarded,
        "Distributor stopped, stopping senders"
    );

    for sender in senders {
        sender.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{numbered, RecordingSink, SinkProbe};
    use std::time::{Duration, Instant};
    use tokio::net::UdpSocket;

    fn spawn_recording(
        names: &[&str],
        capacity: usize,
        shutdown: &CancellationToken,
    ) -> (Vec<TargetSender>, Vec<SinkProbe>) {
        names
            .iter()
            .map(|name| {
                let (sink, probe) = RecordingSink::new(name);
                (TargetSender::spawn(sink, capacity, shutdown, Span::none()), probe)
            })
            .unzip()
    }

    #[tokio::test]
    async fn test_fanout_to_every_sender() {
        let shutdown = CancellationToken::new();
        let (senders, probes) = spawn_recording(&["a", "b", "c"], 10, &shutdown);
        let distributor = Distributor::spawn(senders, 10, &shutdown, Span::none());
        assert_eq!(distributor.sender_count(), 3);

        for i in 0..5 {
            assert!(distributor.send(numbered(i)));
            // Intake holds 10; pace to stay well under it
            tokio::task::yield_now().await;
        }

        let expected: Vec<String> = (0..5).map(|i| format!("/m/{i}")).collect();
        for probe in &probes {
            probe.wait_for_writes(5).await;
            assert_eq!(probe.written_addrs(), expected);
        }

        let intake = distributor.intake_metrics();
        assert_eq!(intake.accepted, 5);
        assert_eq!(intake.dropped, 0);

        distributor.shutdown().await;
    }

    #[tokio::test]
    async fn test_handles_from_many_producers() {
        let shutdown = CancellationToken::new();
        let (senders, probes) = spawn_recording(&["only"], 100, &shutdown);
        let distributor = Distributor::spawn(senders, 100, &shutdown, Span::none());

        let mut tasks = Vec::new();
        for p in 0..4 {
            let handle = distributor.handle();
            tasks.push(tokio::spawn(async move {
                for i in 0..10 {
                    handle.send(numbered(p * 100 + i));
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        probes[0].wait_for_writes(40).await;

        // Each producer's own order survives the interleaving
        let written = probes[0].written_addrs();
        for p in 0..4 {
            let mine: Vec<&String> = written
                .iter()
                .filter(|a| {
                    let n: usize = a.trim_start_matches("/m/").parse().unwrap();
                    n / 100 == p
                })
                .collect();
            let expected: Vec<String> = (0..10).map(|i| format!("/m/{}", p * 100 + i)).collect();
            assert_eq!(mine, expected.iter().collect::<Vec<_>>());
        }

        distributor.shutdown().await;
    }

    #[tokio::test]
    async fn test_stalled_target_does_not_affect_others() {
        let shutdown = CancellationToken::new();
        let (stalled_sink, mut stalled) = RecordingSink::gated("stalled");
        let (healthy_sink, healthy) = RecordingSink::new("healthy");

        let senders = vec![
            TargetSender::spawn(stalled_sink, 4, &shutdown, Span::none()),
            TargetSender::spawn(healthy_sink, 100, &shutdown, Span::none()),
        ];
        let distributor = Distributor::spawn(senders, 100, &shutdown, Span::none());

        distributor.send(numbered(0));
        stalled.wait_started().await;

        for i in 1..50 {
            assert!(distributor.send(numbered(i)));
            tokio::task::yield_now().await;
        }

        healthy.wait_for_writes(50).await;
        let expected: Vec<String> = (0..50).map(|i| format!("/m/{i}")).collect();
        assert_eq!(healthy.written_addrs(), expected);

        let metrics = distributor.metrics();
        assert_eq!(metrics[0].0, "stalled");
        assert!(metrics[0].1.dropped_count > 0);
        assert_eq!(metrics[1].1.dropped_count, 0);

        stalled.release(1000);
        distributor.shutdown().await;
    }

    #[tokio::test]
    async fn test_send_is_non_blocking_when_saturated() {
        let shutdown = CancellationToken::new();
        let (sink, mut probe) = RecordingSink::gated("stalled");
        let senders = vec![TargetSender::spawn(sink, 2, &shutdown, Span::none())];
        let distributor = Distributor::spawn(senders, 2, &shutdown, Span::none());

        distributor.send(numbered(0));
        probe.wait_started().await;

        let start = Instant::now();
        let mut accepted = 0;
        for i in 0..10_000 {
            if distributor.send(numbered(i)) {
                accepted += 1;
            }
        }
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(accepted < 10_000);
        assert!(distributor.intake_metrics().dropped > 0);

        probe.release(20_000);
        distributor.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_every_worker() {
        let shutdown = CancellationToken::new();
        let (senders, probes) = spawn_recording(&["a", "b"], 10, &shutdown);
        let distributor = Distributor::spawn(senders, 10, &shutdown, Span::none());

        distributor.send(numbered(0));
        for probe in &probes {
            probe.wait_for_writes(1).await;
        }
        assert_eq!(distributor.state(), WorkerState::Running);

        shutdown.cancel();

        let wait = async {
            while !distributor.is_stopped() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(2), wait)
            .await
            .expect("workers did not stop");

        assert!(distributor
            .sender_states()
            .iter()
            .all(|(_, state)| *state == WorkerState::Stopped));

        // No further sends after cancellation
        for i in 1..5 {
            distributor.send(numbered(i));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        for probe in &probes {
            assert_eq!(probe.written_count(), 1);
        }

        tokio::time::timeout(Duration::from_secs(2), distributor.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_after_shutdown_is_not_counted_as_congestion() {
        let shutdown = CancellationToken::new();
        let (senders, _probes) = spawn_recording(&["a"], 10, &shutdown);
        let distributor = Distributor::spawn(senders, 10, &shutdown, Span::none());
        let handle = distributor.handle();

        distributor.shutdown().await;

        assert!(!handle.send(numbered(0)));
        assert!(!handle.send(numbered(1)));
        let intake = handle.metrics.snapshot();
        assert_eq!(intake.accepted, 0);
        assert_eq!(intake.dropped, 0);
    }

    #[tokio::test]
    async fn test_abort_does_not_wait_for_stuck_write() {
        let shutdown = CancellationToken::new();
        let (sink, mut probe) = RecordingSink::gated("stuck");
        let senders = vec![TargetSender::spawn(sink, 4, &shutdown, Span::none())];
        let distributor = Distributor::spawn(senders, 4, &shutdown, Span::none());

        distributor.send(numbered(0));
        probe.wait_started().await;

        // The sender never leaves its write, so a waiting shutdown would hang
        shutdown.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(distributor.state(), WorkerState::Stopped);
        assert!(!distributor.is_stopped());

        tokio::time::timeout(Duration::from_secs(2), distributor.abort())
            .await
            .expect("abort waited on the stuck sender");
    }

    #[tokio::test]
    async fn test_builder_over_udp_targets() {
        let t1 = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let t2 = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let targets = vec![
            Target::new("127.0.0.1", t1.local_addr().unwrap().port()),
            Target::new("127.0.0.1", t2.local_addr().unwrap().port()),
        ];

        let shutdown = CancellationToken::new();
        let config = DistributorConfig::new(targets);
        let distributor = DistributorBuilder::new(config, shutdown.clone())
            .build()
            .await
            .unwrap();

        let msg = Message::from_parts("/test", vec![contracts::OscType::Int(42)]);
        assert!(distributor.send(msg.clone()));

        for socket in [&t1, &t2] {
            let mut buf = vec![0u8; contracts::codec::MAX_DATAGRAM_SIZE];
            let (len, _) =
                tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
                    .await
                    .unwrap()
                    .unwrap();
            let decoded = contracts::codec::decode_datagram(&buf[..len]).unwrap();
            assert_eq!(decoded, vec![msg.clone()]);
        }

        shutdown.cancel();
        distributor.shutdown().await;
    }

    #[tokio::test]
    async fn test_builder_fails_on_unresolvable_target() {
        let targets = vec![Target::new("no-such-host.invalid", 9000)];
        let config = DistributorConfig::new(targets);
        let result = DistributorBuilder::new(config, CancellationToken::new())
            .build()
            .await;

        assert!(matches!(result, Err(DispatcherError::TargetResolve { .. })));
    }

    #[test]
    fn test_config_from_blueprint() {
        let mut bp = RepeaterBlueprint::new(vec![8000], vec!["127.0.0.1:9000".into()]);
        bp.sender_queue_capacity = 7;
        let config = DistributorConfig::from_blueprint(&bp).unwrap();
        assert_eq!(config.targets, vec![Target::new("127.0.0.1", 9000)]);
        assert_eq!(config.sender_queue_capacity, 7);
        assert_eq!(config.intake_capacity, 100);
    }
}
