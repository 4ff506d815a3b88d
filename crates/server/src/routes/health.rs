use std::sync::Arc;

use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;

/// Prometheus metrics endpoint, text exposition format
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<String> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(ServerError::NotFound)
}
