use crate::{DocumentIndex, ElasticsearchIndex, IndexBackend, IndexResult, MemoryIndex};
use around_core::IndexConfig;
use std::sync::Arc;

/// Create a document index backend based on configuration
pub fn create_document_index(config: &IndexConfig) -> IndexResult<Arc<dyn DocumentIndex>> {
    match config.backend {
        IndexBackend::Elasticsearch => {
            tracing::info!(url = %config.url, index = %config.name, "Using Elasticsearch index");
            Ok(Arc::new(ElasticsearchIndex::new(config)?))
        }
        IndexBackend::Memory => {
            tracing::warn!("Using in-memory index; posts are lost on restart");
            Ok(Arc::new(MemoryIndex::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_memory_index() {
        let config = IndexConfig {
            backend: IndexBackend::Memory,
            url: String::new(),
            name: "around".to_string(),
            document_type: "_doc".to_string(),
            page_size: 10,
            timeout_secs: 1,
        };
        let index = create_document_index(&config).unwrap();
        assert_eq!(index.backend_type(), IndexBackend::Memory);
    }
}
