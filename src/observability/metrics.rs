//! Metrics collection and exposition.
//!
//! # Metrics
//! - `realm_sessions_active` (gauge): live sessions in the registry
//! - `realm_fanout_total` (counter): per-session fan-out results by kind, outcome
//! - `realm_shutdown_phase` (gauge): 0=idle, 1=counting, 2=disconnecting, 3=terminating
//! - `realm_motd_updates_total` (counter): MOTD changes
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Prometheus exporter is optional and owns its own HTTP listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::broadcast::FanOutReport;
use crate::lifecycle::ShutdownPhase;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_active_sessions(count: usize) {
    metrics::gauge!("realm_sessions_active").set(count as f64);
}

pub fn record_fan_out(kind: &'static str, report: &FanOutReport) {
    let outcomes = [
        ("ok", report.succeeded),
        ("gone", report.gone),
        ("failed", report.failed),
    ];
    for (outcome, count) in outcomes {
        if count > 0 {
            metrics::counter!("realm_fanout_total", "kind" => kind, "outcome" => outcome)
                .increment(count as u64);
        }
    }
}

pub fn record_shutdown_phase(phase: ShutdownPhase) {
    let value = match phase {
        ShutdownPhase::Idle => 0.0,
        ShutdownPhase::Counting => 1.0,
        ShutdownPhase::Disconnecting => 2.0,
        ShutdownPhase::Terminating => 3.0,
    };
    metrics::gauge!("realm_shutdown_phase").set(value);
}

pub fn record_motd_update() {
    metrics::counter!("realm_motd_updates_total").increment(1);
}
