//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ledger_submission_transitions_total` (counter): state transitions by state
//! - `ledger_confirmation_seconds` (histogram): broadcast to confirmation latency
//! - `ledger_confirmation_timeouts_total` (counter): receipts never seen in time
//! - `ledger_field_operations_total` (counter): reads and writes by field, outcome
//! - `ledger_rpc_health` (gauge): 1=healthy, 0=unhealthy

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, address = %addr, "Failed to install metrics exporter"),
    }
}

pub fn record_submission_transition(state: &'static str) {
    metrics::counter!("ledger_submission_transitions_total", "state" => state).increment(1);
}

pub fn record_confirmation_latency(elapsed: Duration) {
    metrics::histogram!("ledger_confirmation_seconds").record(elapsed.as_secs_f64());
}

pub fn record_confirmation_timeout() {
    metrics::counter!("ledger_confirmation_timeouts_total").increment(1);
}

pub fn record_field_operation(field: &'static str, op: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(
        "ledger_field_operations_total",
        "field" => field,
        "op" => op,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_rpc_health(healthy: bool) {
    metrics::gauge!("ledger_rpc_health").set(if healthy { 1.0 } else { 0.0 });
}
