//! Face annotation client (Google Cloud Vision FACE_DETECTION)

use around_core::{AnnotationConfig, AppError};
use around_storage::BlobReader;
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Failed to read image: {0}")]
    Read(#[from] std::io::Error),

    #[error("Annotation request failed: {0}")]
    Request(String),

    #[error("Annotation backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type AnnotationResult<T> = Result<T, AnnotationError>;

impl From<AnnotationError> for AppError {
    fn from(err: AnnotationError) -> Self {
        match err {
            AnnotationError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::AnnotationFailed(other.to_string()),
        }
    }
}

/// Scores how likely a still image is to contain a face.
///
/// Callers only pass images in the encoding the backend accepts. No retries.
#[async_trait]
pub trait FaceAnnotator: Send + Sync {
    /// Read the image from the start of `reader` and return a confidence in [0,1].
    async fn face_confidence(&self, reader: BlobReader) -> AnnotationResult<f64>;
}

/// Google Cloud Vision face detection
pub struct VisionFaceAnnotator {
    http_client: reqwest::Client,
    url: String,
    api_key: String,
}

impl Debug for VisionFaceAnnotator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VisionFaceAnnotator")
            .field("url", &self.url)
            .finish()
    }
}

impl VisionFaceAnnotator {
    pub fn new(config: &AnnotationConfig) -> AnnotationResult<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AnnotationError::ConfigError("ANNOTATION_API_KEY not configured".to_string())
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AnnotationError::ConfigError(format!(
                    "Failed to create HTTP client for annotation backend: {}",
                    e
                ))
            })?;

        Ok(Self {
            http_client,
            url: config.url.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl FaceAnnotator for VisionFaceAnnotator {
    async fn face_confidence(&self, mut reader: BlobReader) -> AnnotationResult<f64> {
        let start = std::time::Instant::now();

        let mut image_data = Vec::new();
        reader.read_to_end(&mut image_data).await?;

        let image_base64 = base64::engine::general_purpose::STANDARD.encode(&image_data);

        let request_body = json!({
            "requests": [{
                "image": {
                    "content": image_base64
                },
                "features": [{
                    "type": "FACE_DETECTION",
                    "maxResults": 1
                }]
            }]
        });

        let response = self
            .http_client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AnnotationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AnnotationError::Backend(format!(
                "{} - {}",
                status, error_text
            )));
        }

        let vision_response: VisionResponse = response.json().await.map_err(|e| {
            AnnotationError::Backend(format!("Failed to parse annotation response: {}", e))
        })?;

        let first_response = vision_response
            .responses
            .into_iter()
            .next()
            .unwrap_or_default();

        if let Some(error) = first_response.error {
            return Err(AnnotationError::Backend(format!(
                "{:?} - {:?}",
                error.code, error.message
            )));
        }

        let confidence = first_response
            .face_annotations
            .first()
            .and_then(|face| face.detection_confidence)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);

        tracing::debug!(
            size_bytes = image_data.len(),
            faces = first_response.face_annotations.len(),
            confidence = confidence,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Face annotation completed"
        );

        Ok(confidence)
    }
}

// Vision API response types
#[derive(Debug, Deserialize)]
struct VisionResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    face_annotations: Vec<FaceAnnotation>,
    error: Option<VisionError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaceAnnotation {
    detection_confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VisionError {
    code: Option<i32>,
    message: Option<String>,
}
