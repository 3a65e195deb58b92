//! Test doubles for sender/distributor tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use contracts::{ContractError, Message, MessageSink, OscType};
use tokio::sync::{mpsc, Semaphore};

/// Sink that records every write; optionally gated or failing
pub(crate) struct RecordingSink {
    name: String,
    written: Arc<Mutex<Vec<Message>>>,
    gate: Option<Arc<Semaphore>>,
    started: Option<mpsc::UnboundedSender<()>>,
    fail: bool,
}

/// Test-side view of a RecordingSink
pub(crate) struct SinkProbe {
    written: Arc<Mutex<Vec<Message>>>,
    gate: Arc<Semaphore>,
    started: mpsc::UnboundedReceiver<()>,
}

impl RecordingSink {
    pub(crate) fn new(name: &str) -> (Self, SinkProbe) {
        Self::build(name, false, false)
    }

    /// Every write blocks until the probe releases a permit
    pub(crate) fn gated(name: &str) -> (Self, SinkProbe) {
        Self::build(name, true, false)
    }

    pub(crate) fn failing(name: &str) -> (Self, SinkProbe) {
        Self::build(name, false, true)
    }

    fn build(name: &str, gated: bool, fail: bool) -> (Self, SinkProbe) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let gate = Arc::new(Semaphore::new(0));
        let (started_tx, started_rx) = mpsc::unbounded_channel();

        let sink = Self {
            name: name.to_string(),
            written: Arc::clone(&written),
            gate: gated.then(|| Arc::clone(&gate)),
            started: Some(started_tx),
            fail,
        };
        let probe = SinkProbe {
            written,
            gate,
            started: started_rx,
        };
        (sink, probe)
    }
}

impl MessageSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, message: &Message) -> Result<(), ContractError> {
        if let Some(started) = &self.started {
            let _ = started.send(());
        }
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if self.fail {
            return Err(ContractError::sink_write(&self.name, "mock failure"));
        }
        self.written.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}

impl SinkProbe {
    /// Let `n` gated writes through
    pub(crate) fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Wait until the worker has entered `write` once more
    pub(crate) async fn wait_started(&mut self) {
        tokio::time::timeout(Duration::from_secs(2), self.started.recv())
            .await
            .expect("write never started");
    }

    pub(crate) fn written_addrs(&self) -> Vec<String> {
        self.written
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.addr().to_string())
            .collect()
    }

    pub(crate) fn written_count(&self) -> usize {
        self.written.lock().unwrap().len()
    }

    /// Poll until at least `n` writes have completed
    pub(crate) async fn wait_for_writes(&self, n: usize) {
        let wait = async {
            while self.written_count() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(2), wait)
            .await
            .unwrap_or_else(|_| panic!("expected {n} writes, got {}", self.written_count()));
    }
}

/// Message with a numbered address, e.g. "/m/3"
pub(crate) fn numbered(i: usize) -> Message {
    Message::from_parts(format!("/m/{i}"), vec![OscType::Int(i as i32)])
}
