//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_access_total` (counter): `/go` outcomes by `outcome`
//! - `gateway_recalc_decisions_total` (counter): recalculation results by `decision`
//! - `gateway_registry_request_duration_seconds` (histogram): registry latency by `op`
//! - `gateway_registry_errors_total` (counter): failed registry calls by `op`
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests can call these freely.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of a gate request (`allowed`, `blocked`, `not_found`).
pub fn record_access(outcome: &'static str) {
    counter!("gateway_access_total", "outcome" => outcome).increment(1);
}

/// Record one per-domain decision made during recalculation.
pub fn record_recalc_decision(decision: &'static str) {
    counter!("gateway_recalc_decisions_total", "decision" => decision).increment(1);
}

/// Record latency and success of a single registry round-trip.
pub fn record_registry_call(op: &'static str, start: Instant, ok: bool) {
    histogram!("gateway_registry_request_duration_seconds", "op" => op)
        .record(start.elapsed().as_secs_f64());
    if !ok {
        counter!("gateway_registry_errors_total", "op" => op).increment(1);
    }
}
