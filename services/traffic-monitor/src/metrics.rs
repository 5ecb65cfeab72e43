//! Prometheus metrics exposition
//!
//! Re-exports the backend's traffic statistics and the monitor's own poll
//! health:
//!
//! - `storefront_requests_total` (gauge): backend requests, as reported
//! - `storefront_unique_visitors` (gauge)
//! - `storefront_errors_total` (gauge)
//! - `storefront_path_hits` (gauge): label `path`
//! - `monitor_polls_total` (counter): label `outcome` (`ok`/`error`)
//! - `monitor_poll_duration_seconds` (histogram)
//! - `monitor_session_active` (gauge): 1 while signed in, 0 after revocation
//!
//! The backend counters are gauges, not counters: the backend owns the
//! monotonic value and the monitor just mirrors the latest observation.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use storefront_client::api::traffic::TrafficSummary;

/// Install the Prometheus recorder and return a handle for rendering.
///
/// `monitor_poll_duration_seconds` gets explicit buckets so it renders as a
/// histogram (with `_bucket` lines) rather than a summary; a poll is one
/// HTTP round trip, so the range runs 5ms to 10s.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full(
                "monitor_poll_duration_seconds".to_string(),
            ),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )
        .expect("failed to set histogram buckets")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Mirror one traffic summary into the exported gauges.
pub fn record_summary(summary: &TrafficSummary) {
    metrics::gauge!("storefront_requests_total").set(summary.requests_total as f64);
    metrics::gauge!("storefront_unique_visitors").set(summary.unique_visitors as f64);
    metrics::gauge!("storefront_errors_total").set(summary.errors_total as f64);
    for entry in &summary.top_paths {
        metrics::gauge!("storefront_path_hits", "path" => entry.path.clone())
            .set(entry.hits as f64);
    }
}

/// Record a completed poll cycle.
pub fn record_poll(outcome: &'static str, duration_secs: f64) {
    metrics::counter!("monitor_polls_total", "outcome" => outcome).increment(1);
    metrics::histogram!("monitor_poll_duration_seconds").record(duration_secs);
}

/// Flip the session gauge (1 signed in, 0 revoked).
pub fn set_session_active(active: bool) {
    metrics::gauge!("monitor_session_active").set(if active { 1.0 } else { 0.0 });
}
