//! Latency probing.
//!
//! # Responsibilities
//! - Periodically time a request to each backend's `/logs` endpoint
//! - Convert the latency into a selection weight
//! - Commit one cycle's weights to the table in a single update

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, Request};
use tokio::sync::broadcast;
use tokio::time;

use crate::config::ProbeConfig;
use crate::http::client::HttpClient;
use crate::load_balancer::weights::weight_for_latency;
use crate::load_balancer::{BackendId, WeightTable};
use crate::observability::{metrics, Journal};

pub struct LatencyProber {
    table: Arc<WeightTable>,
    config: ProbeConfig,
    client: HttpClient,
    journal: Arc<Journal>,
}

impl LatencyProber {
    pub fn new(
        table: Arc<WeightTable>,
        config: ProbeConfig,
        client: HttpClient,
        journal: Arc<Journal>,
    ) -> Self {
        Self {
            table,
            config,
            client,
            journal,
        }
    }

    /// Probe on every interval until shutdown. The first probe happens one
    /// full interval after start.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let period = Duration::from_secs(self.config.interval_secs);
        tracing::info!(
            interval_secs = self.config.interval_secs,
            path = %self.config.path,
            backends = self.table.pool().len(),
            "Latency prober starting"
        );

        // Cycles start on the grid start + k * period. Grid points that pass
        // while a cycle runs are skipped, never queued.
        let mut next = time::Instant::now() + period;

        loop {
            tokio::select! {
                _ = time::sleep_until(next) => {
                    tracing::info!("Starting latency measurement");
                    let weights = self.run_cycle().await;
                    self.table.apply(&weights);
                    next = next_tick(next, period, time::Instant::now());
                }
                _ = shutdown.recv() => {
                    tracing::info!("Latency prober received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Measure every backend once and return the new weights in pool order.
    /// The table is not touched.
    pub async fn run_cycle(&self) -> Vec<(BackendId, u32)> {
        let failure_latency = Duration::from_secs(self.config.failure_latency_secs);
        let mut weights = Vec::with_capacity(self.table.pool().len());

        for backend in self.table.pool() {
            let latency = self.measure(backend).await.unwrap_or(failure_latency);
            let weight = weight_for_latency(latency);

            self.journal
                .record(&format!("Latency for {}: {:?}", backend, latency))
                .await;
            self.journal
                .record(&format!("Updated weight for {}: {}", backend, weight))
                .await;
            tracing::info!(backend = %backend, latency = ?latency, weight, "Backend reweighted");

            metrics::record_probe_latency(backend.as_str(), latency);
            metrics::record_backend_weight(backend.as_str(), weight);
            weights.push((backend.clone(), weight));
        }

        weights
    }

    /// Time one probe, body included. `None` on any failure.
    pub async fn measure(&self, backend: &BackendId) -> Option<Duration> {
        let uri = format!("http://{}{}", backend, self.config.path);
        let request = match Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::USER_AGENT, "tandem-proxy-prober")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(backend = %backend, error = %e, "Failed to build probe request");
                return None;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let start = Instant::now();
        let probe = async {
            let response = self.client.request(request).await?;
            axum::body::to_bytes(Body::new(response.into_body()), usize::MAX)
                .await
                .map_err(ProbeError::Body)?;
            Ok::<_, ProbeError>(())
        };

        match time::timeout(timeout, probe).await {
            Ok(Ok(())) => Some(start.elapsed()),
            Ok(Err(e)) => {
                tracing::warn!(backend = %backend, error = %e, "Latency probe failed");
                None
            }
            Err(_) => {
                tracing::warn!(backend = %backend, "Latency probe timed out");
                None
            }
        }
    }
}

/// First grid point after `last` that is still ahead of `now`.
fn next_tick(last: time::Instant, period: Duration, now: time::Instant) -> time::Instant {
    let mut next = last + period;
    if next > now || period.is_zero() {
        return next;
    }
    let behind = (now - next).as_nanos() / period.as_nanos();
    next += period * u32::try_from(behind + 1).unwrap_or(u32::MAX);
    next
}

#[derive(Debug, thiserror::Error)]
enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),
    #[error("body read failed: {0}")]
    Body(axum::Error),
}
