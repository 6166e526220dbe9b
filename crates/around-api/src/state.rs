use around_core::Config;
use around_index::DocumentIndex;
use around_services::{FaceAnnotator, PostIngestionPipeline, PostQueryService};
use around_storage::BlobStore;
use std::sync::Arc;

/// Shared application state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub index: Arc<dyn DocumentIndex>,
    pub ingestion: PostIngestionPipeline,
    pub queries: PostQueryService,
}

impl AppState {
    /// Wire the pipeline and query service over already-built backends.
    pub fn new(
        config: Config,
        blob_store: Arc<dyn BlobStore>,
        index: Arc<dyn DocumentIndex>,
        annotator: Option<Arc<dyn FaceAnnotator>>,
    ) -> Self {
        let ingestion = PostIngestionPipeline::new(
            blob_store,
            index.clone(),
            annotator,
            config.storage.bucket.clone(),
            config.annotation.suffix.clone(),
        );
        let queries = PostQueryService::new(index.clone(), &config.search);

        Self {
            config,
            index,
            ingestion,
            queries,
        }
    }
}
