//! Elasticsearch REST backend

use crate::traits::{DocumentIndex, Hit, IndexError, IndexResult, Query, SearchHits};
use crate::IndexBackend;
use around_core::models::{Post, PostId};
use around_core::IndexConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

/// Elasticsearch index client
pub struct ElasticsearchIndex {
    http_client: reqwest::Client,
    base_url: String,
    index: String,
    document_type: String,
    page_size: usize,
}

impl Debug for ElasticsearchIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ElasticsearchIndex")
            .field("base_url", &self.base_url)
            .field("index", &self.index)
            .finish()
    }
}

impl ElasticsearchIndex {
    pub fn new(config: &IndexConfig) -> IndexResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                IndexError::ConfigError(format!("Failed to create HTTP client for index: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.name.clone(),
            document_type: config.document_type.clone(),
            page_size: config.page_size,
        })
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, self.index)
    }

    fn document_url(&self, id: &PostId) -> String {
        format!("{}/{}/{}", self.index_url(), self.document_type, id)
    }

    /// Post mapping. `location` has to be a geo-point for radius queries.
    fn mapping() -> Value {
        json!({
            "mappings": {
                "properties": {
                    "user": { "type": "keyword" },
                    "message": { "type": "text" },
                    "location": { "type": "geo_point" },
                    "url": { "type": "keyword", "index": false },
                    "type": { "type": "keyword" },
                    "face": { "type": "double" }
                }
            }
        })
    }

    async fn create_index(&self) -> IndexResult<()> {
        let response = self
            .http_client
            .put(self.index_url())
            .json(&Self::mapping())
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(index = %self.index, "Index created");
            return Ok(());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        // Another instance created it between our check and this call
        if error_text.contains("resource_already_exists_exception") {
            return Ok(());
        }

        Err(IndexError::Unavailable(format!(
            "Failed to create index {}: {} - {}",
            self.index, status, error_text
        )))
    }
}

// Elasticsearch search response types
#[derive(Debug, Deserialize)]
struct EsSearchResponse {
    #[serde(default)]
    took: u64,
    hits: EsHits,
}

#[derive(Debug, Deserialize)]
struct EsHits {
    #[serde(default)]
    total: Option<EsTotal>,
    #[serde(default)]
    hits: Vec<EsHit>,
}

/// `hits.total` is a bare number before 7.x and an object after.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EsTotal {
    Count(u64),
    Object { value: u64 },
}

impl EsTotal {
    fn value(&self) -> u64 {
        match self {
            EsTotal::Count(n) | EsTotal::Object { value: n } => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EsHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Value,
    /// Sort values of this hit; the cursor for the next page.
    #[serde(default)]
    sort: Option<Value>,
}

impl From<EsHit> for Hit {
    fn from(hit: EsHit) -> Self {
        Hit {
            id: hit.id,
            source: hit.source,
        }
    }
}

impl ElasticsearchIndex {
    async fn search_page(
        &self,
        query: &Query,
        search_after: Option<&Value>,
    ) -> IndexResult<EsSearchResponse> {
        let mut body = json!({
            "size": self.page_size,
            "query": query.to_dsl(),
            "sort": ["_doc"],
        });
        if let Some(cursor) = search_after {
            body["search_after"] = cursor.clone();
        }

        let response = self
            .http_client
            .post(format!("{}/_search", self.index_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| IndexError::QueryFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IndexError::QueryFailed(format!("{} - {}", status, error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| IndexError::QueryFailed(format!("Failed to parse search response: {}", e)))
    }
}

#[async_trait]
impl DocumentIndex for ElasticsearchIndex {
    async fn ensure_index(&self) -> IndexResult<()> {
        let response = self
            .http_client
            .head(self.index_url())
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!(index = %self.index, "Index already exists");
                Ok(())
            }
            StatusCode::NOT_FOUND => self.create_index().await,
            status => Err(IndexError::Unavailable(format!(
                "Unexpected status checking index {}: {}",
                self.index, status
            ))),
        }
    }

    async fn ping(&self) -> IndexResult<()> {
        let response = self
            .http_client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IndexError::Unavailable(format!(
                "Index backend returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn upsert(&self, id: &PostId, post: &Post) -> IndexResult<()> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .put(self.document_url(id))
            .query(&[("refresh", "true")])
            .json(post)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, index = %self.index, post_id = %id, "Index request failed");
                IndexError::WriteFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IndexError::WriteFailed(format!("{} - {}", status, error_text)));
        }

        tracing::info!(
            index = %self.index,
            post_id = %id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Post indexed"
        );

        Ok(())
    }

    async fn search(&self, query: &Query) -> IndexResult<SearchHits> {
        let mut hits: Vec<Hit> = Vec::new();
        let mut took_ms = 0;
        let mut reported_total = None;
        let mut cursor: Option<Value> = None;
        let mut pages = 0;

        loop {
            let page = self.search_page(query, cursor.as_ref()).await?;
            pages += 1;
            took_ms += page.took;
            if reported_total.is_none() {
                reported_total = page.hits.total.as_ref().map(EsTotal::value);
            }

            let page_len = page.hits.hits.len();
            cursor = page.hits.hits.last().and_then(|hit| hit.sort.clone());
            hits.extend(page.hits.hits.into_iter().map(Hit::from));

            if page_len < self.page_size || cursor.is_none() {
                break;
            }
        }

        let collected = hits.len() as u64;
        let total = reported_total.unwrap_or(collected);
        if collected < total {
            tracing::warn!(
                index = %self.index,
                collected,
                total,
                "Index returned fewer hits than it reported"
            );
        }

        tracing::debug!(
            index = %self.index,
            took_ms,
            total_hits = total,
            pages,
            "Index query completed"
        );

        Ok(SearchHits {
            took_ms,
            total,
            hits,
        })
    }

    fn backend_type(&self) -> IndexBackend {
        IndexBackend::Elasticsearch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use around_core::models::{new_post_id, Location};
    use mockito::Matcher;

    fn config(url: String) -> IndexConfig {
        IndexConfig {
            backend: IndexBackend::Elasticsearch,
            url,
            name: "around".to_string(),
            document_type: "_doc".to_string(),
            page_size: 10_000,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_upsert_puts_document_with_refresh() {
        let mut server = mockito::Server::new_async().await;
        let id = new_post_id();
        let mock = server
            .mock("PUT", format!("/around/_doc/{}", id).as_str())
            .match_query(Matcher::UrlEncoded("refresh".into(), "true".into()))
            .match_body(Matcher::PartialJson(json!({
                "user": "alice",
                "location": {"lat": 37.7749, "lon": -122.4194},
                "type": "unknown"
            })))
            .with_status(201)
            .with_body(r#"{"result":"created"}"#)
            .create_async()
            .await;

        let index = ElasticsearchIndex::new(&config(server.url())).unwrap();
        let post = Post::new("alice", "hello", Location::new(37.7749, -122.4194));
        index.upsert(&id, &post).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upsert_failure_is_write_failed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", Matcher::Regex("^/around/_doc/.*".to_string()))
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":"failed to parse field [location]"}"#)
            .create_async()
            .await;

        let index = ElasticsearchIndex::new(&config(server.url())).unwrap();
        let post = Post::new("alice", "", Location::new(95.0, 0.0));
        let err = index.upsert(&new_post_id(), &post).await.unwrap_err();
        assert!(matches!(err, IndexError::WriteFailed(ref msg) if msg.contains("location")));
    }

    #[tokio::test]
    async fn test_search_parses_hits() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/around/_search")
            .match_body(Matcher::PartialJson(json!({
                "size": 10000,
                "sort": ["_doc"],
                "query": {"range": {"face": {"gte": 0.75}}}
            })))
            .with_status(200)
            .with_body(
                json!({
                    "took": 3,
                    "hits": {
                        "total": {"value": 1, "relation": "eq"},
                        "hits": [
                            {"_id": "a", "_source": {"user": "alice", "face": 0.9}, "sort": [0]}
                        ]
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let index = ElasticsearchIndex::new(&config(server.url())).unwrap();
        let hits = index.search(&Query::range_gte("face", 0.75)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(hits.took_ms, 3);
        assert_eq!(hits.total, 1);
        assert_eq!(hits.hits[0].id, "a");
        assert_eq!(hits.hits[0].source["face"], json!(0.9));
    }

    fn page(ids: &[(&str, u64)], total: u64) -> String {
        let hits: Vec<Value> = ids
            .iter()
            .map(|(id, doc)| json!({"_id": id, "_source": {"user": id}, "sort": [doc]}))
            .collect();
        json!({
            "took": 2,
            "hits": {"total": {"value": total, "relation": "eq"}, "hits": hits}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_search_pages_past_page_size() {
        let mut server = mockito::Server::new_async().await;
        // Matches every request but is used up after the first one.
        let first = server
            .mock("POST", "/around/_search")
            .match_body(Matcher::PartialJson(json!({"size": 2, "sort": ["_doc"]})))
            .with_status(200)
            .with_body(page(&[("a", 0), ("b", 1)], 3))
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/around/_search")
            .match_body(Matcher::PartialJson(json!({"search_after": [1]})))
            .with_status(200)
            .with_body(page(&[("c", 2)], 3))
            .expect(1)
            .create_async()
            .await;

        let mut config = config(server.url());
        config.page_size = 2;
        let index = ElasticsearchIndex::new(&config).unwrap();
        let hits = index
            .search(&Query::geo_distance("location", 0.0, 0.0, 200.0))
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let ids: Vec<&str> = hits.hits.iter().map(|hit| hit.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(hits.total, 3);
        assert_eq!(hits.took_ms, 4);
    }

    #[tokio::test]
    async fn test_search_keeps_reported_total_when_short() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/around/_search")
            .with_status(200)
            .with_body(page(&[("a", 0)], 5))
            .create_async()
            .await;

        let mut config = config(server.url());
        config.page_size = 2;
        let index = ElasticsearchIndex::new(&config).unwrap();
        let hits = index.search(&Query::range_gte("face", 0.75)).await.unwrap();

        assert_eq!(hits.hits.len(), 1);
        assert_eq!(hits.total, 5);
    }

    #[tokio::test]
    async fn test_search_accepts_numeric_total() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/around/_search")
            .with_status(200)
            .with_body(r#"{"took":1,"hits":{"total":0,"hits":[]}}"#)
            .create_async()
            .await;

        let index = ElasticsearchIndex::new(&config(server.url())).unwrap();
        let hits = index
            .search(&Query::geo_distance("location", 0.0, 0.0, 200.0))
            .await
            .unwrap();
        assert_eq!(hits.total, 0);
        assert!(hits.hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_error_is_query_failed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/around/_search")
            .with_status(404)
            .with_body(r#"{"error":{"type":"index_not_found_exception"}}"#)
            .create_async()
            .await;

        let index = ElasticsearchIndex::new(&config(server.url())).unwrap();
        let err = index
            .search(&Query::range_gte("face", 0.75))
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::QueryFailed(ref msg) if msg.contains("index_not_found")));
    }

    #[tokio::test]
    async fn test_ensure_index_creates_missing_index() {
        let mut server = mockito::Server::new_async().await;
        let head = server
            .mock("HEAD", "/around")
            .with_status(404)
            .create_async()
            .await;
        let create = server
            .mock("PUT", "/around")
            .match_body(Matcher::PartialJson(json!({
                "mappings": {"properties": {"location": {"type": "geo_point"}}}
            })))
            .with_status(200)
            .with_body(r#"{"acknowledged":true}"#)
            .create_async()
            .await;

        let index = ElasticsearchIndex::new(&config(server.url())).unwrap();
        index.ensure_index().await.unwrap();

        head.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_ensure_index_skips_existing_index() {
        let mut server = mockito::Server::new_async().await;
        let _head = server
            .mock("HEAD", "/around")
            .with_status(200)
            .create_async()
            .await;
        let create = server
            .mock("PUT", "/around")
            .expect(0)
            .create_async()
            .await;

        let index = ElasticsearchIndex::new(&config(server.url())).unwrap();
        index.ensure_index().await.unwrap();

        create.assert_async().await;
    }
}
