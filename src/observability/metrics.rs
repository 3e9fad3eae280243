//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_gate_rejections_total` (counter): 403s by filter
//! - `edge_gate_asset_hits_total` (counter): static files served
//! - `edge_gate_responses_total` (counter): loader and fallback responses by kind
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rejection(filter: &'static str) {
    ::metrics::counter!("edge_gate_rejections_total", "filter" => filter).increment(1);
}

pub fn record_asset_hit() {
    ::metrics::counter!("edge_gate_asset_hits_total").increment(1);
}

pub fn record_response(kind: &'static str) {
    ::metrics::counter!("edge_gate_responses_total", "kind" => kind).increment(1);
}
