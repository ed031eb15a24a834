//! Metrics collection and exposition.
//!
//! # Metrics
//! - `image_responses_total` (counter): finalized responses by output format
//! - `image_response_bytes` (histogram): body size of finalized responses
//! - `image_response_errors_total` (counter): failed requests by error kind
//! - `pool_allocation_failures_total` (counter): refused pool allocations
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter is optional and owns its own listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_response(extension: &str, bytes: u64) {
    ::metrics::counter!("image_responses_total", "format" => extension.to_string()).increment(1);
    ::metrics::histogram!("image_response_bytes").record(bytes as f64);
}

pub fn record_error(kind: &'static str) {
    ::metrics::counter!("image_response_errors_total", "kind" => kind).increment(1);
}

pub fn record_allocation_failure() {
    ::metrics::counter!("pool_allocation_failures_total").increment(1);
}
