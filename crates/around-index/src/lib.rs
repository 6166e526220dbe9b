//! Around Index Library
//!
//! Document index client for posts. A [`DocumentIndex`] upserts post
//! documents keyed by post identifier (visible to reads once the call returns)
//! and answers the two query shapes the read side needs: geo-radius and
//! numeric range.

pub mod elasticsearch;
pub mod factory;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use around_core::IndexBackend;
pub use elasticsearch::ElasticsearchIndex;
pub use factory::create_document_index;
pub use memory::MemoryIndex;
pub use traits::{DocumentIndex, Hit, IndexError, IndexResult, Query, SearchHits};
