//! Metrics collection and exposition.
//!
//! # Metrics
//! - `depositor_transfers_total` (counter): submitted transfers by phase, outcome
//! - `depositor_receipt_polls_total` (counter): receipt lookups issued by pollers
//! - `depositor_planned_transfers` (gauge): destinations needing funds in the current run

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record `count` transfers with the same outcome.
pub fn record_transfer(phase: &'static str, success: bool, count: u64) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!("depositor_transfers_total", "phase" => phase, "outcome" => outcome)
        .increment(count);
}

pub fn record_receipt_poll() {
    ::metrics::counter!("depositor_receipt_polls_total").increment(1);
}

pub fn record_planned(count: usize) {
    ::metrics::gauge!("depositor_planned_transfers").set(count as f64);
}
