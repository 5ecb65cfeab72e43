//! Background traffic polling
//!
//! Spawns a periodic task that pulls the backend's traffic summary through
//! the SDK and mirrors it into the Prometheus gauges. The task runs
//! independently of the serving surface; a failing backend degrades
//! /health but never blocks it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use storefront_client::StorefrontClient;
use tracing::{debug, warn};

use crate::metrics;
use crate::state::MonitorState;

/// Spawn the poll task. The first poll runs immediately, then every
/// `interval`.
pub fn spawn_poll_task(
    client: StorefrontClient,
    state: Arc<MonitorState>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            poll_cycle(&client, &state).await;
        }
    })
}

/// Run one poll: fetch the summary, export it, update health counters.
async fn poll_cycle(client: &StorefrontClient, state: &MonitorState) {
    let started = Instant::now();
    match client.traffic_summary().await {
        Ok(summary) => {
            metrics::record_summary(&summary);
            metrics::record_poll("ok", started.elapsed().as_secs_f64());
            state.record_poll_success();
            debug!(
                requests_total = summary.requests_total,
                unique_visitors = summary.unique_visitors,
                "traffic summary polled"
            );
        }
        Err(e) => {
            metrics::record_poll("error", started.elapsed().as_secs_f64());
            state.record_poll_failure();
            warn!(error = %e, "traffic poll failed");
        }
    }
}
