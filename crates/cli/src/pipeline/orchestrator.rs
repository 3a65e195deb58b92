//! Repeater orchestrator - builds, runs, and stops every component.
//!
//! Startup order: senders, then the distributor, then the listeners. Any
//! failure cancels whatever already started, so the process never runs with
//! a partial topology.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::RepeaterBlueprint;
use dispatcher::{Distributor, DistributorBuilder, DistributorConfig};
use ingestion::ListenerSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Span};

use super::RepeaterStats;
use crate::error::{RepeaterError, Result};

/// Upper bound on waiting for workers after cancellation
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Repeater configuration
#[derive(Debug, Clone)]
pub struct RepeaterConfig {
    /// Validated topology
    pub blueprint: RepeaterBlueprint,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// How long to wait for workers to stop
    pub shutdown_timeout: Duration,
}

impl RepeaterConfig {
    pub fn new(blueprint: RepeaterBlueprint) -> Self {
        Self {
            blueprint,
            metrics_port: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

/// Lifecycle controller
pub struct Repeater {
    config: RepeaterConfig,
    shutdown: CancellationToken,
    span: Span,
}

impl Repeater {
    /// Create a repeater with its own shutdown token
    pub fn new(config: RepeaterConfig) -> Self {
        Self::with_shutdown(config, CancellationToken::new())
    }

    /// Create a repeater driven by an existing token
    pub fn with_shutdown(config: RepeaterConfig, shutdown: CancellationToken) -> Self {
        Self {
            config,
            shutdown,
            span: info_span!("repeater"),
        }
    }

    /// Token that stops the whole process when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Start, run until the token is cancelled, then stop
    pub async fn run(self) -> Result<RepeaterStats> {
        let running = self.start().await?;
        info!(addrs = ?running.listen_addrs(), "Listening");
        Ok(running.wait().await)
    }

    /// Start every component
    ///
    /// # Errors
    /// Metrics endpoint, target resolution, sink creation, or any listener
    /// bind failure. The shutdown token is cancelled before the error is returned.
    pub async fn start(self) -> Result<RunningRepeater> {
        let started = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            if let Err(e) = observability::init_metrics_only(port) {
                self.shutdown.cancel();
                return Err(RepeaterError::Metrics(e));
            }
            info!("Metrics endpoint available on port {}", port);
        }

        // Senders and distributor
        let distributor_config = match DistributorConfig::from_blueprint(blueprint) {
            Ok(config) => config,
            Err(e) => {
                self.shutdown.cancel();
                return Err(e.into());
            }
        };
        let distributor = match DistributorBuilder::new(distributor_config, self.shutdown.clone())
            .with_span(self.span.clone())
            .build()
            .await
        {
            Ok(distributor) => distributor,
            Err(e) => {
                self.shutdown.cancel();
                return Err(e.into());
            }
        };

        info!(targets = distributor.sender_count(), "Distributor configured");

        // Listeners
        let listeners = match ListenerSet::bind_all(
            &blueprint.listen_host,
            &blueprint.listen_ports,
            &self.shutdown,
            self.span.clone(),
        )
        .await
        {
            Ok(listeners) => listeners,
            Err(e) => {
                self.shutdown.cancel();
                distributor.shutdown().await;
                return Err(e.into());
            }
        };

        let handle = distributor.handle();
        listeners.start_all(Arc::new(move |message| {
            handle.send(message);
        }));

        info!(
            listeners = listeners.len(),
            targets = distributor.sender_count(),
            "Repeater running"
        );

        Ok(RunningRepeater {
            distributor,
            listeners,
            shutdown: self.shutdown,
            shutdown_timeout: self.config.shutdown_timeout,
            started,
        })
    }
}

/// A started repeater
pub struct RunningRepeater {
    distributor: Distributor,
    listeners: ListenerSet,
    shutdown: CancellationToken,
    shutdown_timeout: Duration,
    started: Instant,
}

impl RunningRepeater {
    /// Bound listener addresses, in configuration order
    pub fn listen_addrs(&self) -> Vec<SocketAddr> {
        self.listeners.local_addrs()
    }

    /// Wait for the shutdown token, then stop
    pub async fn wait(self) -> RepeaterStats {
        self.shutdown.cancelled().await;
        info!("Shutdown requested");
        self.stop().await
    }

    /// Cancel everything and wait, bounded, for the workers to stop
    ///
    /// Queued messages are discarded, not drained.
    pub async fn stop(self) -> RepeaterStats {
        self.shutdown.cancel();
        self.listeners.stop_all();

        let distributor = &self.distributor;
        let listeners = &self.listeners;
        let all_stopped = async {
            while !distributor.is_stopped() || listeners.is_listening() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };

        let clean = tokio::time::timeout(self.shutdown_timeout, all_stopped)
            .await
            .is_ok();
        if !clean {
            warn!(
                timeout_secs = self.shutdown_timeout.as_secs_f64(),
                distributor = %distributor.state(),
                senders = ?distributor.sender_states(),
                "Workers did not stop in time"
            );
        }

        let stats = RepeaterStats::collect(
            self.started.elapsed(),
            self.listeners.len(),
            self.listeners.total_metrics(),
            self.distributor.intake_metrics(),
            self.distributor.metrics(),
        );

        if clean {
            self.distributor.shutdown().await;
        } else {
            self.distributor.abort().await;
        }

        info!(
            received = stats.summary.received,
            intake_dropped = stats.summary.intake_dropped,
            duration_secs = stats.duration.as_secs_f64(),
            "Repeater stopped"
        );

        stats
    }
}
