//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by tier, method, status
//! - `proxy_request_duration_seconds` (histogram): latency to response head
//! - `proxy_backend_weight` (gauge): current selection weight per backend
//! - `proxy_probe_latency_seconds` (gauge): last probe latency per backend
//! - `proxy_forbidden_captures_total` (counter): 403 bodies written to the journal
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(tier: &'static str, method: &str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "tier" => tier,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "tier" => tier)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_weight(backend: &str, weight: u32) {
    gauge!("proxy_backend_weight", "backend" => backend.to_string()).set(f64::from(weight));
}

pub fn record_probe_latency(backend: &str, latency: Duration) {
    gauge!("proxy_probe_latency_seconds", "backend" => backend.to_string())
        .set(latency.as_secs_f64());
}

pub fn record_forbidden_capture() {
    counter!("proxy_forbidden_captures_total").increment(1);
}
