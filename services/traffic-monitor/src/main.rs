//! Storefront traffic monitor
//!
//! Single-binary service that:
//! 1. Signs in to the storefront backend with a service account
//! 2. Polls the admin traffic summary on a fixed interval through the SDK
//! 3. Re-exports the statistics as Prometheus metrics
//! 4. Serves /health and /metrics

mod config;
mod metrics;
mod poller;
mod state;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metrics_exporter_prometheus::PrometheusHandle;
use storefront_client::{FileTokenStore, StorefrontClient};

use crate::config::Config;
use crate::state::{MonitorSignout, MonitorState};

/// How long in-flight requests get to drain after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Sign-in attempts at startup before giving up.
const SIGN_IN_ATTEMPTS: u32 = 3;
const SIGN_IN_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    monitor: Arc<MonitorState>,
    prometheus: PrometheusHandle,
}

/// Build the axum router with all routes and shared state.
fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting traffic-monitor");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.monitor.listen_addr,
        base_url = %config.backend.base_url,
        poll_interval_secs = config.monitor.poll_interval_secs,
        "configuration loaded"
    );

    let monitor_state = MonitorState::new(config.monitor.failure_threshold);

    let token_store = FileTokenStore::open(config.backend.token_file.clone())
        .with_context(|| format!("failed to open {}", config.backend.token_file.display()))?;

    let client = StorefrontClient::builder()
        .base_url(config.backend.base_url.clone())
        .token_store(Arc::new(token_store))
        .signout_observer(MonitorSignout::new(monitor_state.clone()))
        .build()
        .context("failed to build storefront client")?;

    // A pair persisted by a previous run may still be valid; sign in fresh
    // only when the store comes up empty.
    if client.session().initialize()? {
        info!("resuming persisted session");
    } else {
        sign_in_with_retry(&client, &config).await?;
    }
    monitor_state.set_session_active(true);

    let poll_interval = Duration::from_secs(config.monitor.poll_interval_secs);
    let _poll_task = poller::spawn_poll_task(client, monitor_state.clone(), poll_interval);

    let app_state = AppState {
        monitor: monitor_state,
        prometheus: prometheus_handle,
    };
    let app = build_router(app_state, config.monitor.max_connections);

    let listener = TcpListener::bind(config.monitor.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.monitor.listen_addr))?;

    info!(addr = %config.monitor.listen_addr, "accepting requests");

    // Graceful shutdown with drain timeout:
    // 1. shutdown_signal() fires on SIGTERM/SIGINT
    // 2. axum stops accepting new connections and drains in-flight requests
    // 3. DRAIN_TIMEOUT keeps a slow client from blocking process exit;
    //    the timer starts at signal receipt, not at server start
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => {
            info!("all in-flight requests drained");
        }
        Ok(Ok(Err(e))) => {
            error!(error = %e, "server error during shutdown");
        }
        Ok(Err(e)) => {
            error!(error = %e, "server task panicked");
        }
        Err(_) => {
            warn!(
                drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
                "drain timeout exceeded, forcing shutdown"
            );
        }
    }

    info!("shutdown complete");
    Ok(())
}

/// Sign in the service account, retrying transient failures.
async fn sign_in_with_retry(client: &StorefrontClient, config: &Config) -> Result<()> {
    let password = config
        .account
        .password
        .as_ref()
        .context("no service-account password resolved")?;

    let mut attempt = 1;
    loop {
        match client.sign_in(&config.account.email, password.expose()).await {
            Ok(_) => {
                info!(email = %config.account.email, "service account signed in");
                return Ok(());
            }
            Err(e) if attempt < SIGN_IN_ATTEMPTS => {
                warn!(
                    error = %e,
                    attempt,
                    retry_in_secs = SIGN_IN_RETRY_DELAY.as_secs(),
                    "sign-in failed, retrying"
                );
                tokio::time::sleep(SIGN_IN_RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).context("service account sign-in failed");
            }
        }
    }
}

/// Health endpoint: 200 with poll statistics while polling succeeds, 503
/// once the consecutive-failure threshold is crossed.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.monitor.snapshot();

    let status_code = if snapshot.healthy {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };
    let body = serde_json::json!({
        "status": if snapshot.healthy { "healthy" } else { "degraded" },
        "uptime_seconds": snapshot.uptime_seconds,
        "polls_total": snapshot.polls_total,
        "polls_failed": snapshot.polls_failed,
        "consecutive_failures": snapshot.consecutive_failures,
        "session_active": snapshot.session_active,
    });

    (
        status_code,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics endpoint — returns metrics in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    /// Create a PrometheusHandle for tests without installing a global
    /// recorder. build_recorder() avoids the "recorder already installed"
    /// panic when multiple tests run in the same process.
    fn test_prometheus_handle() -> PrometheusHandle {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        recorder.handle()
    }

    fn test_app_state(monitor: Arc<MonitorState>) -> AppState {
        AppState {
            monitor,
            prometheus: test_prometheus_handle(),
        }
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_reports_poll_statistics() {
        let monitor = MonitorState::new(3);
        monitor.set_session_active(true);
        monitor.record_poll_success();
        monitor.record_poll_success();
        monitor.record_poll_failure();

        let app = build_router(test_app_state(monitor), 64);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["polls_total"], 3);
        assert_eq!(json["polls_failed"], 1);
        assert_eq!(json["consecutive_failures"], 1);
        assert_eq!(json["session_active"], true);
        assert!(json["uptime_seconds"].is_u64());
    }

    #[tokio::test]
    async fn health_endpoint_degrades_after_threshold_failures() {
        let monitor = MonitorState::new(2);
        monitor.record_poll_failure();
        monitor.record_poll_failure();

        let app = build_router(test_app_state(monitor), 64);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::SERVICE_UNAVAILABLE,
            "health must return 503 once polling is persistently failing"
        );
        let json = json_body(response).await;
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["consecutive_failures"], 2);
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_prometheus_format() {
        let app = build_router(test_app_state(MonitorState::new(3)), 64);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(
            content_type.contains("text/plain"),
            "metrics endpoint must return text/plain Prometheus format"
        );
    }

    #[tokio::test]
    async fn unknown_routes_are_not_served() {
        let app = build_router(test_app_state(MonitorState::new(3)), 64);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
