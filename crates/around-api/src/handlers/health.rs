use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub index: String,
    pub index_backend: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Index is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let index_healthy = match tokio::time::timeout(PING_TIMEOUT, state.index.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Index health check failed");
            false
        }
        Err(_) => {
            tracing::warn!("Index health check timed out");
            false
        }
    };

    let status = if index_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if index_healthy { "healthy" } else { "unhealthy" }.to_string(),
        index: if index_healthy { "healthy" } else { "unhealthy" }.to_string(),
        index_backend: state.index.backend_type().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status, Json(body))
}
