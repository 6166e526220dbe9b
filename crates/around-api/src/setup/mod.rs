//! Process bootstrap: configuration checks, telemetry, backends and routes.

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::Context;
use around_core::Config;
use axum::Router;
use std::sync::Arc;

/// Validate configuration, install telemetry, build backends and the router.
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    config.validate().context("Invalid configuration")?;

    crate::telemetry::init_telemetry().context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment,
        index_backend = %config.index.backend,
        storage_backend = %config.storage.backend,
        bucket = %config.storage.bucket,
        annotation_enabled = config.annotation.enabled,
        "Starting Around API"
    );

    let state = services::initialize_services(config).await?;
    let app = routes::setup_routes(config, state.clone())?;

    Ok((state, app))
}
