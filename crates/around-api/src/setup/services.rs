use crate::state::AppState;
use anyhow::Context;
use around_core::Config;
use around_index::create_document_index;
use around_services::{FaceAnnotator, VisionFaceAnnotator};
use around_storage::create_blob_store;
use std::sync::Arc;

/// Build every backend from configuration and provision the index.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>, anyhow::Error> {
    let blob_store = create_blob_store(&config.storage)
        .await
        .context("Failed to initialize blob storage")?;
    tracing::info!(backend = %blob_store.backend_type(), "Blob storage initialized");

    let index =
        create_document_index(&config.index).context("Failed to initialize document index")?;
    index
        .ensure_index()
        .await
        .context("Failed to provision document index")?;
    tracing::info!(
        backend = %index.backend_type(),
        index = %config.index.name,
        "Document index ready"
    );

    let annotator = build_annotator(config)?;

    Ok(Arc::new(AppState::new(
        config.clone(),
        blob_store,
        index,
        annotator,
    )))
}

fn build_annotator(config: &Config) -> Result<Option<Arc<dyn FaceAnnotator>>, anyhow::Error> {
    if !config.annotation.enabled {
        tracing::warn!("Face annotation disabled; posts are stored without a face score");
        return Ok(None);
    }

    let annotator = VisionFaceAnnotator::new(&config.annotation)
        .context("Failed to initialize face annotator")?;
    tracing::info!(suffix = %config.annotation.suffix, "Face annotation enabled");

    Ok(Some(Arc::new(annotator)))
}
