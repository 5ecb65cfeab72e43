//! Shared monitor state
//!
//! Poll counters and session health, shared between the poll task, the
//! health endpoint, and the client's signout observer. All counters are
//! atomics; the health snapshot is a consistent-enough read for an
//! operations endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use storefront_session::SignoutObserver;
use tracing::warn;

pub struct MonitorState {
    started_at: Instant,
    polls_total: AtomicU64,
    polls_failed: AtomicU64,
    consecutive_failures: AtomicU64,
    session_active: AtomicBool,
    failure_threshold: u64,
}

/// A point-in-time view for the health endpoint.
pub struct HealthSnapshot {
    pub healthy: bool,
    pub uptime_seconds: u64,
    pub polls_total: u64,
    pub polls_failed: u64,
    pub consecutive_failures: u64,
    pub session_active: bool,
}

impl MonitorState {
    pub fn new(failure_threshold: u64) -> Arc<Self> {
        Arc::new(Self {
            started_at: Instant::now(),
            polls_total: AtomicU64::new(0),
            polls_failed: AtomicU64::new(0),
            consecutive_failures: AtomicU64::new(0),
            session_active: AtomicBool::new(false),
            failure_threshold,
        })
    }

    pub fn record_poll_success(&self) {
        self.polls_total.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    pub fn record_poll_failure(&self) {
        self.polls_total.fetch_add(1, Ordering::Relaxed);
        self.polls_failed.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_session_active(&self, active: bool) {
        self.session_active.store(active, Ordering::Relaxed);
        crate::metrics::set_session_active(active);
    }

    /// Healthy until `failure_threshold` polls have failed in a row.
    pub fn snapshot(&self) -> HealthSnapshot {
        let consecutive_failures = self.consecutive_failures.load(Ordering::Relaxed);
        HealthSnapshot {
            healthy: consecutive_failures < self.failure_threshold,
            uptime_seconds: self.started_at.elapsed().as_secs(),
            polls_total: self.polls_total.load(Ordering::Relaxed),
            polls_failed: self.polls_failed.load(Ordering::Relaxed),
            consecutive_failures,
            session_active: self.session_active.load(Ordering::Relaxed),
        }
    }
}

/// Bridges the client's forced-signout notification into monitor state.
///
/// The daemon has no login view to redirect to; a revoked session flips the
/// health flag and gauge so operators see it, and the poll task keeps
/// failing visibly until the service is re-credentialed.
pub struct MonitorSignout {
    state: Arc<MonitorState>,
}

impl MonitorSignout {
    pub fn new(state: Arc<MonitorState>) -> Arc<Self> {
        Arc::new(Self { state })
    }
}

impl SignoutObserver for MonitorSignout {
    fn session_revoked(&self, login_path: &str) {
        warn!(login_path, "session revoked, polls will fail until re-credentialed");
        self.state.set_session_active(false);
    }
}
