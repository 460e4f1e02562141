//! Metrics collection and exposition.
//!
//! # Metrics
//! - `subconverter_requests_total` (counter): requests by endpoint, status
//! - `subconverter_request_duration_seconds` (histogram): latency per endpoint
//! - `subconverter_pairs_total` (counter): pairs by mode and outcome
//!
//! # Design Decisions
//! - Exporter is optional (`observability.metrics_enabled`)
//! - Recording without an installed exporter is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "subconverter_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("subconverter_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record pair outcomes for one request.
pub fn record_pairs(mode: &'static str, applied: usize, skipped: usize) {
    metrics::counter!("subconverter_pairs_total", "mode" => mode, "outcome" => "applied")
        .increment(applied as u64);
    metrics::counter!("subconverter_pairs_total", "mode" => mode, "outcome" => "skipped")
        .increment(skipped as u64);
}
