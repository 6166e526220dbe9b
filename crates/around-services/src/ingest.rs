//! Post ingestion pipeline
//!
//! Stages run strictly in order and the first failure ends the request:
//! identify, upload, classify, annotate (only for the accepted encoding) and
//! index. Nothing is rolled back: a blob uploaded before a later failure stays
//! in the bucket without an index entry.

use around_core::models::{new_post_id, CreatedPost, Location, Post};
use around_core::{classify_suffix, file_suffix, AppError};
use around_index::DocumentIndex;
use around_storage::{object_key, BlobReader, BlobStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempPath;

use crate::annotation::FaceAnnotator;

/// Uploaded file spooled to disk so it can be read more than once.
#[derive(Debug)]
pub struct MediaAttachment {
    filename: String,
    path: TempPath,
    size: u64,
}

impl MediaAttachment {
    /// `filename` is the name the client sent, used as-is for classification.
    pub fn new(filename: impl Into<String>, path: TempPath, size: u64) -> Self {
        Self {
            filename: filename.into(),
            path,
            size,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Open a fresh reader positioned at the start of the file.
    pub async fn open(&self) -> std::io::Result<BlobReader> {
        let path: &Path = &self.path;
        let file = tokio::fs::File::open(path).await?;
        Ok(Box::pin(file))
    }
}

/// A post as parsed from the request, before any pipeline stage ran.
#[derive(Debug)]
pub struct IncomingPost {
    /// Verified caller identity.
    pub user: String,
    pub message: String,
    pub location: Location,
    pub media: Option<MediaAttachment>,
}

pub struct PostIngestionPipeline {
    blob_store: Arc<dyn BlobStore>,
    index: Arc<dyn DocumentIndex>,
    annotator: Option<Arc<dyn FaceAnnotator>>,
    bucket: String,
    annotation_suffix: String,
}

impl PostIngestionPipeline {
    /// Build a pipeline. Without an annotator the annotate stage is skipped
    /// and `face` stays unevaluated.
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        index: Arc<dyn DocumentIndex>,
        annotator: Option<Arc<dyn FaceAnnotator>>,
        bucket: impl Into<String>,
        annotation_suffix: impl Into<String>,
    ) -> Self {
        Self {
            blob_store,
            index,
            annotator,
            bucket: bucket.into(),
            annotation_suffix: annotation_suffix.into(),
        }
    }

    #[tracing::instrument(skip_all, fields(user = %incoming.user, post_id = tracing::field::Empty))]
    pub async fn ingest(&self, incoming: IncomingPost) -> Result<CreatedPost, AppError> {
        let IncomingPost {
            user,
            message,
            location,
            media,
        } = incoming;

        let media = media.ok_or(AppError::ImageMissing)?;

        let id = new_post_id();
        tracing::Span::current().record("post_id", tracing::field::display(&id));

        let key = object_key(&id);
        let reader = media
            .open()
            .await
            .map_err(|e| AppError::WriteFailed(format!("Failed to read attachment: {}", e)))?;
        let url = self
            .blob_store
            .upload(reader, &self.bucket, &key, Some(media.size()))
            .await?;
        tracing::info!(bucket = %self.bucket, key = %key, "Attachment uploaded");

        let suffix = file_suffix(media.filename());
        let mut post = Post::new(user, message, location);
        post.media_type = classify_suffix(&suffix);

        if suffix == self.annotation_suffix {
            if let Some(annotator) = &self.annotator {
                let reader = media.open().await.map_err(|e| {
                    AppError::AnnotationFailed(format!("Failed to re-read attachment: {}", e))
                })?;
                let face = annotator.face_confidence(reader).await?;
                tracing::info!(face = face, "Attachment annotated");
                post.face = Some(face);
            }
        }

        post.url = url.clone();
        self.index.upsert(&id, &post).await?;

        tracing::info!(media_type = %post.media_type, "Post saved");

        Ok(CreatedPost { id, url })
    }
}
