//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration under the configured route prefix
//! - Middleware stack (request ID, logging, tracing)
//! - Prometheus recorder installation
//! - Graceful shutdown handling

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::middleware::{log_requests, request_id};
use crate::routes::{health, home, import, not_found};
use crate::state::ServerState;

/// Build the Axum router with all routes and middleware
///
/// - `GET <prefix>` and `GET <prefix>/`: home
/// - `POST <prefix>/createDB`: reset
/// - `POST <prefix>/upload`: upload, body capped at `max_form_bytes`
/// - `GET /metrics`: Prometheus text
///
/// No request timeout is layered over the import routes: a pipeline run is
/// bounded by the outbound call deadlines instead.
pub fn build_router(state: Arc<ServerState>) -> Router {
    let prefix = state.config.route_prefix();

    let import_routes = Router::new()
        .route(&format!("{prefix}/createDB"), post(import::create_db))
        .route(&format!("{prefix}/upload"), post(import::upload))
        .layer(DefaultBodyLimit::max(state.config.max_form_bytes));

    let home_routes = if prefix.is_empty() {
        Router::new().route("/", get(home))
    } else {
        Router::new()
            .route(&prefix, get(home))
            .route(&format!("{prefix}/"), get(home))
    };

    Router::new()
        .merge(home_routes)
        .merge(import_routes)
        .route("/metrics", get(health::metrics))
        .fallback(not_found)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Install the global Prometheus recorder and describe the import metrics
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus metrics recorder")?;
    snippet_import::describe_metrics();
    Ok(handle)
}

/// Start the import HTTP server
///
/// Blocks until the server is shut down via SIGTERM or Ctrl+C.
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.as_str())
        .with_target(false)
        .with_thread_ids(true)
        .json()
        .init();

    config.validate()?;

    let metrics = if config.metrics_enabled {
        Some(install_metrics()?)
    } else {
        None
    };

    let addr: SocketAddr = config.socket_addr()?;
    let state = Arc::new(ServerState::from_config(config.clone(), metrics)?);
    let app = build_router(state);

    tracing::info!(
        %addr,
        prefix = %config.route_prefix(),
        volume = %config.volume_path,
        pod = %config.pod_name,
        "Starting snippet import server"
    );
    tracing::info!(
        storage = %config.storage_url,
        conversion = %config.conversion_url,
        auth = %config.auth_url,
        timeout_secs = config.upstream_timeout_secs,
        "Upstream services"
    );
    tracing::info!(
        max_image_bytes = config.max_image_bytes,
        max_form_bytes = config.max_form_bytes,
        remove_orphans = config.remove_orphans_on_failure,
        metrics = config.metrics_enabled,
        "Limits"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
