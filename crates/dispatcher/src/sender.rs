//! TargetSender - one target's bounded queue and worker task

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn, Instrument, Span};

use contracts::{Message, MessageSink, WorkerState};

use crate::metrics::SenderMetrics;
use crate::queue::{self, QueueReceiver, QueueSender};
use crate::worker::WorkerStatus;

/// Default per-target queue capacity
pub const DEFAULT_SENDER_CAPACITY: usize = 100;

/// Handle to a running Target Sender
///
/// `send` never blocks: a full queue drops the incoming message and keeps
/// what is already queued.
pub struct TargetSender {
    /// Sender name (the target)
    name: String,
    /// Queue feeding the worker
    queue: QueueSender<Message>,
    /// Shared metrics
    metrics: Arc<SenderMetrics>,
    /// Running/Stopped flag
    status: WorkerStatus,
    /// Stops this worker; child of the shared shutdown token
    stop: CancellationToken,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl TargetSender {
    /// Create a Target Sender and spawn its worker inside `span`
    pub fn spawn<S: MessageSink + Send + 'static>(
        sink: S,
        queue_capacity: usize,
        shutdown: &CancellationToken,
        span: Span,
    ) -> Self {
        let name = sink.name().to_string();
        let (queue, rx) = queue::bounded(queue_capacity);
        let metrics = Arc::new(SenderMetrics::new());
        let status = WorkerStatus::new();
        let stop = shutdown.child_token();

        let worker = sender_worker(
            sink,
            rx,
            stop.clone(),
            Arc::clone(&metrics),
            status.clone(),
            name.clone(),
        );
        let worker_handle = tokio::spawn(worker.instrument(span));

        Self {
            name,
            queue,
            metrics,
            status,
            stop,
            worker_handle,
        }
    }

    /// Get sender name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SenderMetrics> {
        &self.metrics
    }

    /// Worker status flag (shared)
    pub fn status(&self) -> &WorkerStatus {
        &self.status
    }

    pub fn state(&self) -> WorkerState {
        self.status.state()
    }

    /// Offer a message (non-blocking)
    ///
    /// Returns true if queued, false if dropped
    pub fn send(&self, message: Message) -> bool {
        if self.queue.try_enqueue(message) {
            record_depth(&self.metrics, &self.name, self.queue.len());
            return true;
        }

        if self.queue.is_closed() {
            trace!(sender = %self.name, "Sender stopped, message dropped");
        } else {
            self.metrics.inc_dropped_count();
            observability::record_sender_dropped(&self.name);
            debug!(sender = %self.name, "Queue full, message dropped");
        }
        false
    }

    /// Stop the worker and wait for it; queued messages are discarded
    pub async fn shutdown(self) {
        self.stop.cancel();
        if let Err(e) = self.worker_handle.await {
            error!(sender = %self.name, error = ?e, "Worker task panicked");
            self.status.mark_stopped();
        }
        debug!(sender = %self.name, "TargetSender shutdown complete");
    }
}

/// Queue depth, in-process and exported
fn record_depth(metrics: &SenderMetrics, name: &str, depth: usize) {
    metrics.set_queue_len(depth);
    observability::record_queue_depth(name, depth);
}

/// Worker task: dequeue in FIFO order, one blocking write at a time
async fn sender_worker<S: MessageSink>(
    mut sink: S,
    mut rx: QueueReceiver<Message>,
    stop: CancellationToken,
    metrics: Arc<SenderMetrics>,
    status: WorkerStatus,
    name: String,
) {
    debug!(sender = %name, "Starting sender");

    while let Some(message) = rx.dequeue_or_cancel(&stop).await {
        record_depth(&metrics, &name, rx.len());

        debug!(sender = %name, msg = %message, "sending message");

        // Not raced against `stop`: an in-flight write always completes.
        match sink.write(&message).await {
            Ok(()) => {
                metrics.inc_write_count();
                observability::record_message_sent(&name, true);
            }
            Err(e) => {
                metrics.inc_failure_count();
                observability::record_message_sent(&name, false);
                warn!(sender = %name, addr = %message.addr(), error = %e, "Write failed");
            }
        }
    }

    let discarded = rx.len();
    if discarded > 0 {
        debug!(sender = %name, discarded, "Discarding queued messages");
    }

    if let Err(e) = sink.close().await {
        error!(sender = %name, error = %e, "Close failed on shutdown");
    }

    status.mark_stopped();
    debug!(sender = %name, "Sender stopped");
}
