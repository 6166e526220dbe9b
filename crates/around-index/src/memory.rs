//! In-process index backend
//!
//! Keeps documents in insertion order behind a `RwLock`. Queries scan every
//! document, so this backend suits development and tests, not large corpora.

use crate::traits::{DocumentIndex, Hit, IndexError, IndexResult, Query, SearchHits};
use crate::IndexBackend;
use around_core::geo::distance_km;
use around_core::models::{Post, PostId};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use validator::Validate;

#[derive(Debug, Default)]
pub struct MemoryIndex {
    documents: RwLock<Vec<(String, Value)>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document as-is, bypassing geo-point validation.
    pub async fn put_raw(&self, id: impl Into<String>, document: Value) {
        let id = id.into();
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = document,
            None => documents.push((id, document)),
        }
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

/// Resolve a top-level or dotted field path.
fn lookup<'a>(document: &'a Value, field: &str) -> Option<&'a Value> {
    field
        .split('.')
        .try_fold(document, |value, segment| value.get(segment))
}

fn geo_point(value: &Value) -> Option<(f64, f64)> {
    Some((value.get("lat")?.as_f64()?, value.get("lon")?.as_f64()?))
}

fn matches(document: &Value, query: &Query) -> bool {
    match query {
        Query::GeoDistance {
            field,
            lat,
            lon,
            radius_km,
        } => lookup(document, field)
            .and_then(geo_point)
            .map(|(doc_lat, doc_lon)| distance_km(*lat, *lon, doc_lat, doc_lon) <= *radius_km)
            .unwrap_or(false),
        Query::RangeGte { field, gte } => lookup(document, field)
            .and_then(Value::as_f64)
            .map(|value| value >= *gte)
            .unwrap_or(false),
    }
}

#[async_trait]
impl DocumentIndex for MemoryIndex {
    async fn ensure_index(&self) -> IndexResult<()> {
        Ok(())
    }

    async fn ping(&self) -> IndexResult<()> {
        Ok(())
    }

    async fn upsert(&self, id: &PostId, post: &Post) -> IndexResult<()> {
        if !post.location.is_finite() {
            return Err(IndexError::WriteFailed(format!(
                "failed to parse field [location]: non-finite coordinate {:?}",
                post.location
            )));
        }
        post.location.validate().map_err(|e| {
            IndexError::WriteFailed(format!("failed to parse field [location]: {}", e))
        })?;

        let document =
            serde_json::to_value(post).map_err(|e| IndexError::WriteFailed(e.to_string()))?;
        self.put_raw(id.to_string(), document).await;

        tracing::debug!(post_id = %id, "Post indexed in memory");
        Ok(())
    }

    async fn search(&self, query: &Query) -> IndexResult<SearchHits> {
        let start = std::time::Instant::now();
        let documents = self.documents.read().await;

        let hits: Vec<Hit> = documents
            .iter()
            .filter(|(_, document)| matches(document, query))
            .map(|(id, document)| Hit {
                id: id.clone(),
                source: document.clone(),
            })
            .collect();

        Ok(SearchHits {
            took_ms: start.elapsed().as_millis() as u64,
            total: hits.len() as u64,
            hits,
        })
    }

    fn backend_type(&self) -> IndexBackend {
        IndexBackend::Memory
    }
}
