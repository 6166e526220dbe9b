//! Read-side queries over indexed posts.

use around_core::models::{Post, PostResponse};
use around_core::{AppError, SearchConfig};
use around_index::{DocumentIndex, Query, SearchHits};
use std::sync::Arc;

const LOCATION_FIELD: &str = "location";

pub struct PostQueryService {
    index: Arc<dyn DocumentIndex>,
    default_radius_km: f64,
    cluster_threshold: f64,
}

impl PostQueryService {
    pub fn new(index: Arc<dyn DocumentIndex>, config: &SearchConfig) -> Self {
        Self {
            index,
            default_radius_km: config.default_radius_km,
            cluster_threshold: config.cluster_threshold,
        }
    }

    /// Posts within `range_km` (default radius when `None`) of `(lat, lon)`,
    /// in the order the index returned them.
    pub async fn search_by_location(
        &self,
        lat: f64,
        lon: f64,
        range_km: Option<f64>,
    ) -> Result<Vec<PostResponse>, AppError> {
        let radius_km = range_km.unwrap_or(self.default_radius_km);
        let query = Query::geo_distance(LOCATION_FIELD, lat, lon, radius_km);
        let hits = self.index.search(&query).await?;

        tracing::info!(
            lat = lat,
            lon = lon,
            radius_km = radius_km,
            took_ms = hits.took_ms,
            total_hits = hits.total,
            "Search by location completed"
        );

        project_hits(hits)
    }

    /// Posts whose `term` field is at least the cluster threshold. `term` is
    /// passed to the index unvalidated.
    pub async fn cluster_by_term(&self, term: &str) -> Result<Vec<PostResponse>, AppError> {
        let query = Query::range_gte(term, self.cluster_threshold);
        let hits = self.index.search(&query).await?;

        tracing::info!(
            term = %term,
            threshold = self.cluster_threshold,
            took_ms = hits.took_ms,
            total_hits = hits.total,
            "Cluster by term completed"
        );

        project_hits(hits)
    }
}

/// Decode every hit into a post. One undecodable hit fails the whole result.
fn project_hits(hits: SearchHits) -> Result<Vec<PostResponse>, AppError> {
    hits.hits
        .into_iter()
        .map(|hit| {
            serde_json::from_value::<Post>(hit.source)
                .map(PostResponse::from)
                .map_err(|e| AppError::SerializationFailed(format!("hit {}: {}", hit.id, e)))
        })
        .collect()
}
