//! Metrics collection and exposition.
//!
//! # Metrics
//! - `watchdog_checks_total` (counter): completed checks by status
//! - `watchdog_connection_up` (gauge): 1=up, 0=down
//! - `watchdog_connection_changes` (gauge): transitions since start
//! - `watchdog_probe_latency_ms` (histogram): latency of successful probes
//! - `watchdog_log_append_failures_total` (counter): rows dropped
//! - `watchdog_api_requests_total` (counter): API reads by outcome
//!
//! Without an installed exporter every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::monitor::Status;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_check(status: Status, latency_ms: i64, changes: u64) {
    counter!("watchdog_checks_total", "status" => status.as_str()).increment(1);
    gauge!("watchdog_connection_up").set(if status == Status::Up { 1.0 } else { 0.0 });
    gauge!("watchdog_connection_changes").set(changes as f64);
    if status == Status::Up {
        histogram!("watchdog_probe_latency_ms").record(latency_ms as f64);
    }
}

pub fn record_append_failure() {
    counter!("watchdog_log_append_failures_total").increment(1);
}

pub fn record_api_request(outcome: &'static str) {
    counter!("watchdog_api_requests_total", "outcome" => outcome).increment(1);
}
