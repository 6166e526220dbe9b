//! Test helpers: build AppState and router for integration tests.
//!
//! Backends are in-process: a `MemoryIndex`, local blob storage under a temp
//! dir and a stub face annotator, so no external services are needed.
#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use around_api::constants::API_PREFIX;
use around_api::setup::routes;
use around_api::state::AppState;
use around_core::models::{Post, PostId};
use around_core::Config;
use around_index::{
    DocumentIndex, IndexBackend, IndexError, IndexResult, MemoryIndex, Query, SearchHits,
};
use around_services::annotation::{AnnotationResult, FaceAnnotator};
use around_storage::{BlobReader, LocalStorage};
use async_trait::async_trait;
use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_BUCKET: &str = "around-media";
pub const TEST_BASE_URL: &str = "http://media.test";

/// Path under the authenticated API prefix, e.g. `api_path("/search")`.
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Face annotator returning a fixed confidence.
pub struct StubAnnotator {
    confidence: f64,
    calls: AtomicUsize,
}

impl StubAnnotator {
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FaceAnnotator for StubAnnotator {
    async fn face_confidence(&self, _reader: BlobReader) -> AnnotationResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.confidence)
    }
}

/// Index whose writes always fail; reads return nothing.
pub struct FailingIndex;

#[async_trait]
impl DocumentIndex for FailingIndex {
    async fn ensure_index(&self) -> IndexResult<()> {
        Ok(())
    }

    async fn ping(&self) -> IndexResult<()> {
        Err(IndexError::Unavailable("connection refused".to_string()))
    }

    async fn upsert(&self, _id: &PostId, _post: &Post) -> IndexResult<()> {
        Err(IndexError::WriteFailed("connection refused".to_string()))
    }

    async fn search(&self, _query: &Query) -> IndexResult<SearchHits> {
        Ok(SearchHits::default())
    }

    fn backend_type(&self) -> IndexBackend {
        IndexBackend::Elasticsearch
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub index: Arc<MemoryIndex>,
    pub annotator: Arc<StubAnnotator>,
    pub storage_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of blobs written to the test bucket.
    pub fn blob_count(&self) -> usize {
        std::fs::read_dir(self.storage_dir.path().join(TEST_BUCKET))
            .expect("bucket directory")
            .count()
    }
}

/// App over a fresh memory index; annotated images score `face_confidence`.
pub async fn setup_test_app_with_face(face_confidence: f64) -> TestApp {
    let index = Arc::new(MemoryIndex::new());
    build_app(index.clone(), index, face_confidence).await
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_face(0.9).await
}

/// App whose pipeline and queries use `index` instead of the memory index.
pub async fn setup_test_app_with_index(index: Arc<dyn DocumentIndex>) -> TestApp {
    build_app(Arc::new(MemoryIndex::new()), index, 0.9).await
}

async fn build_app(
    memory: Arc<MemoryIndex>,
    index: Arc<dyn DocumentIndex>,
    face_confidence: f64,
) -> TestApp {
    let storage_dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::create_dir_all(storage_dir.path().join(TEST_BUCKET))
        .expect("Failed to create bucket directory");

    let config = create_test_config(&storage_dir);

    let blob_store = LocalStorage::new(storage_dir.path(), TEST_BASE_URL.to_string())
        .await
        .expect("Failed to create local storage");
    let annotator = Arc::new(StubAnnotator::new(face_confidence));

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(blob_store),
        index,
        Some(annotator.clone()),
    ));

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        index: memory,
        annotator,
        storage_dir,
    }
}

fn create_test_config(storage_dir: &TempDir) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("JWT_SECRET", auth::TEST_JWT_SECRET.to_string()),
        ("MEDIA_BUCKET", TEST_BUCKET.to_string()),
        ("STORAGE_BACKEND", "local".to_string()),
        (
            "LOCAL_STORAGE_PATH",
            storage_dir.path().to_string_lossy().into_owned(),
        ),
        ("LOCAL_STORAGE_BASE_URL", TEST_BASE_URL.to_string()),
        ("INDEX_BACKEND", "memory".to_string()),
        ("ANNOTATION_API_KEY", "unused".to_string()),
        ("CORS_ORIGINS", "*".to_string()),
    ]);

    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test config");
    config.validate().expect("Test config should validate");
    config
}
