//! UdpListener - one bound UDP endpoint decoding OSC datagrams
//!
//! The socket is bound at construction, so a port already in use fails
//! before anything starts. `listen` registers the single catch-all callback
//! and spawns the receive task.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::{codec, MessageCallback, MessageSource};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, Instrument, Span};

use crate::error::{IngestionError, Result};
use crate::metrics::ListenerMetrics;

/// OSC listener on one UDP endpoint
pub struct UdpListener {
    name: String,
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    listening: Arc<AtomicBool>,
    stop: CancellationToken,
    metrics: Arc<ListenerMetrics>,
    span: Span,
}

impl UdpListener {
    /// Bind `addr`; the receive task starts on `listen`
    ///
    /// # Errors
    /// `IngestionError::Bind` if the endpoint cannot be acquired
    #[instrument(name = "udp_listener_bind", skip(shutdown, span))]
    pub async fn bind(addr: SocketAddr, shutdown: &CancellationToken, span: Span) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| IngestionError::Bind { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| IngestionError::Bind { addr, source })?;

        info!(addr = %local_addr, "Starting receiver");

        Ok(Self {
            name: format!("udp:{}", local_addr),
            socket: Arc::new(socket),
            local_addr,
            listening: Arc::new(AtomicBool::new(false)),
            stop: shutdown.child_token(),
            metrics: Arc::new(ListenerMetrics::new()),
            span,
        })
    }

    /// Actual bound address (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Shared metrics
    pub fn metrics(&self) -> &Arc<ListenerMetrics> {
        &self.metrics
    }
}

impl MessageSource for UdpListener {
    fn name(&self) -> &str {
        &self.name
    }

    /// Must be called from within a tokio runtime
    fn listen(&self, callback: MessageCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let task = receive_loop(
            Arc::clone(&self.socket),
            callback,
            self.stop.clone(),
            Arc::clone(&self.metrics),
            Arc::clone(&self.listening),
            self.name.clone(),
        );
        tokio::spawn(task.instrument(self.span.clone()));
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(listener = %self.name, "stopping listener");
        }
        self.stop.cancel();
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

async fn receive_loop(
    socket: Arc<UdpSocket>,
    callback: MessageCallback,
    stop: CancellationToken,
    metrics: Arc<ListenerMetrics>,
    listening: Arc<AtomicBool>,
    name: String,
) {
    let mut buf = vec![0u8; codec::MAX_DATAGRAM_SIZE];

    loop {
        let received = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            received = socket.recv_from(&mut buf) => received,
        };

        let (len, peer) = match received {
            Ok(received) => received,
            Err(e) => {
                // e.g. ICMP port-unreachable surfaced on some platforms
                trace!(listener = %name, error = %e, "recv failed");
                continue;
            }
        };
        metrics.record_datagram();

        match codec::decode_datagram(&buf[..len]) {
            Ok(messages) => {
                for message in messages {
                    metrics.record_message();
                    observability::record_message_received(&name);
                    trace!(listener = %name, peer = %peer, addr = %message.addr(), "decoded");
                    callback(message);
                }
            }
            Err(e) => {
                metrics.record_decode_error();
                observability::record_decode_error(&name);
                debug!(
                    listener = %name,
                    peer = %peer,
                    bytes = len,
                    error = %e,
                    "Dropping undecodable datagram"
                );
            }
        }
    }

    listening.store(false, Ordering::SeqCst);
    debug!(listener = %name, "Receiver stopped");
}
