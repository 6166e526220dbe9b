//! Document index abstraction trait

use crate::IndexBackend;
use around_core::geo::format_radius_km;
use around_core::models::{Post, PostId};
use around_core::AppError;
use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

/// Index operation errors
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index write failed: {0}")]
    WriteFailed(String),

    #[error("Index query failed: {0}")]
    QueryFailed(String),

    #[error("Index unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

impl From<IndexError> for AppError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::WriteFailed(msg) => AppError::IndexWriteFailed(msg),
            IndexError::QueryFailed(msg) | IndexError::Unavailable(msg) => {
                AppError::IndexQueryFailed(msg)
            }
            IndexError::ConfigError(msg) => AppError::Internal(msg),
        }
    }
}

/// Read-side query shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Documents whose geo-point `field` lies within `radius_km` of `(lat, lon)`.
    GeoDistance {
        field: String,
        lat: f64,
        lon: f64,
        radius_km: f64,
    },
    /// Documents whose numeric `field` is greater than or equal to `gte`.
    /// The field name is passed through unvalidated.
    RangeGte { field: String, gte: f64 },
}

impl Query {
    pub fn geo_distance(field: impl Into<String>, lat: f64, lon: f64, radius_km: f64) -> Self {
        Query::GeoDistance {
            field: field.into(),
            lat,
            lon,
            radius_km,
        }
    }

    pub fn range_gte(field: impl Into<String>, gte: f64) -> Self {
        Query::RangeGte {
            field: field.into(),
            gte,
        }
    }

    /// Render as Elasticsearch query DSL.
    pub fn to_dsl(&self) -> Value {
        match self {
            Query::GeoDistance {
                field,
                lat,
                lon,
                radius_km,
            } => {
                let mut clause = serde_json::Map::new();
                clause.insert("distance".to_string(), json!(format_radius_km(*radius_km)));
                clause.insert(field.clone(), json!({ "lat": lat, "lon": lon }));
                json!({ "geo_distance": clause })
            }
            Query::RangeGte { field, gte } => json!({ "range": { field.as_str(): { "gte": gte } } }),
        }
    }
}

/// One matching document, source left untyped for the caller to project.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: String,
    pub source: Value,
}

/// Result set of a query, in the order the index returned it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub took_ms: u64,
    pub total: u64,
    pub hits: Vec<Hit>,
}

/// Document index abstraction trait
///
/// All index backends (Elasticsearch, in-memory) must implement this trait.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Create the index with its post mapping if it does not exist yet.
    /// `location` must be a geo-point before the first write.
    async fn ensure_index(&self) -> IndexResult<()>;

    /// Check the index backend is reachable.
    async fn ping(&self) -> IndexResult<()>;

    /// Create or replace the document stored under `id`.
    ///
    /// Returns once the write is visible to subsequent queries.
    async fn upsert(&self, id: &PostId, post: &Post) -> IndexResult<()>;

    /// Run a query and return every matching document.
    async fn search(&self, query: &Query) -> IndexResult<SearchHits>;

    /// Get the index backend type
    fn backend_type(&self) -> IndexBackend;
}
