//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mockstack_proxyrules_decisions_total` (counter): routing outcomes by `outcome`
//! - `mockstack_filefixtures_renders_total` (counter): fixture lookups by `outcome`
//! - `mockstack_upstream_requests_total` (counter): upstream calls by `status`
//! - `mockstack_upstream_duration_seconds` (histogram): upstream latency
//!
//! Recording goes through the `metrics` facade and is free when no recorder
//! is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Count one routing decision.
pub fn record_decision(outcome: &'static str) {
    metrics::counter!("mockstack_proxyrules_decisions_total", "outcome" => outcome).increment(1);
}

/// Count one fixture lookup (`rendered` or `missing`).
pub fn record_fixture(outcome: &'static str) {
    metrics::counter!("mockstack_filefixtures_renders_total", "outcome" => outcome).increment(1);
}

/// Record an upstream call; `status` is `None` when no response arrived.
pub fn record_upstream(status: Option<u16>, start: Instant) {
    let status = status.map_or_else(|| "error".to_string(), |s| s.to_string());
    metrics::counter!("mockstack_upstream_requests_total", "status" => status).increment(1);
    metrics::histogram!("mockstack_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}
