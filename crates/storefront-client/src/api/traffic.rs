//! Admin traffic statistics

use serde::Deserialize;

use crate::error::Result;
use crate::request::OutboundRequest;
use crate::transport::StorefrontClient;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathHits {
    pub path: String,
    pub hits: u64,
}

/// Aggregate traffic counters as reported by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSummary {
    pub requests_total: u64,
    pub unique_visitors: u64,
    pub errors_total: u64,
    #[serde(default)]
    pub top_paths: Vec<PathHits>,
}

impl StorefrontClient {
    /// Current traffic statistics (admin only; a non-admin session gets 403
    /// and is signed out by recovery).
    pub async fn traffic_summary(&self) -> Result<TrafficSummary> {
        self.execute_json(OutboundRequest::get("/api/admin/traffic")).await
    }
}
