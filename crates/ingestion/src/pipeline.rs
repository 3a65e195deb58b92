//! ListenerSet - every configured listen port, bound all-or-nothing

use std::net::{IpAddr, SocketAddr};

use contracts::{MessageCallback, MessageSource};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, instrument, Span};

use crate::error::{IngestionError, Result};
use crate::listener::UdpListener;
use crate::metrics::MetricsSnapshot;

/// All listeners of one process
///
/// Every listener forwards into the same callback.
pub struct ListenerSet {
    listeners: Vec<UdpListener>,
}

impl ListenerSet {
    /// Bind one listener per port on `host`
    ///
    /// Fails on the first bind error; listeners bound so far are stopped
    /// and released, so there is never a partial set.
    #[instrument(name = "listener_set_bind", skip(shutdown, span))]
    pub async fn bind_all(
        host: &str,
        ports: &[u16],
        shutdown: &CancellationToken,
        span: Span,
    ) -> Result<Self> {
        let ip: IpAddr = host.parse().map_err(|e: std::net::AddrParseError| {
            IngestionError::InvalidAddress {
                addr: host.to_string(),
                message: e.to_string(),
            }
        })?;

        let mut listeners = Vec::with_capacity(ports.len());
        for port in ports {
            let addr = SocketAddr::new(ip, *port);
            let listener_span = info_span!(parent: &span, "receiver", port = *port);
            match UdpListener::bind(addr, shutdown, listener_span).await {
                Ok(listener) => listeners.push(listener),
                Err(e) => {
                    for listener in &listeners {
                        listener.stop();
                    }
                    return Err(e);
                }
            }
        }

        Ok(Self { listeners })
    }

    /// Register the forwarding callback on every listener
    pub fn start_all(&self, callback: MessageCallback) {
        for listener in &self.listeners {
            listener.listen(callback.clone());
        }
        info!(listeners = self.listeners.len(), "All receivers started");
    }

    /// Stop every listener
    pub fn stop_all(&self) {
        for listener in &self.listeners {
            listener.stop();
        }
    }

    /// True while any listener's receive task is running
    pub fn is_listening(&self) -> bool {
        self.listeners.iter().any(|l| l.is_listening())
    }

    /// Bound addresses, in port order
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners.iter().map(UdpListener::local_addr).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Per-listener metrics
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.listeners
            .iter()
            .map(|l| (l.name().to_string(), l.metrics().snapshot()))
            .collect()
    }

    /// Summed metrics over every listener
    pub fn total_metrics(&self) -> MetricsSnapshot {
        self.listeners
            .iter()
            .map(|l| l.metrics().snapshot())
            .fold(MetricsSnapshot::default(), |acc, s| acc + s)
    }
}
