//! Blob storage abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must implement.

use crate::StorageBackend;
use around_core::AppError;
use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Bucket unavailable: {0}")]
    Unavailable(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Failed to grant public read: {0}")]
    AclFailed(String),

    #[error("Failed to read object metadata: {0}")]
    LinkFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Attachment content handed to a backend. Consumed until EOF.
pub type BlobReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => AppError::StorageUnavailable(msg),
            StorageError::WriteFailed(msg) | StorageError::LinkFailed(msg) => {
                AppError::WriteFailed(msg)
            }
            StorageError::IoError(e) => AppError::WriteFailed(e.to_string()),
            StorageError::AclFailed(msg) => AppError::AclFailed(msg),
            StorageError::InvalidKey(msg) | StorageError::ConfigError(msg) => {
                AppError::Internal(msg)
            }
        }
    }
}

/// Blob storage abstraction trait
///
/// Backends implement the four primitive steps; [`BlobStore::upload`] runs
/// them in order and stops at the first failure. An object written before a
/// later step fails is left in place.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Verify the bucket exists and is reachable.
    async fn check_bucket(&self, bucket: &str) -> StorageResult<()>;

    /// Stream `reader` into `bucket/key`, replacing any existing object.
    /// Returns the number of bytes written.
    async fn write_object(
        &self,
        bucket: &str,
        key: &str,
        content_length: Option<u64>,
        reader: BlobReader,
    ) -> StorageResult<u64>;

    /// Grant anonymous read access to the object.
    async fn make_public(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Public link through which the object can be fetched.
    async fn media_link(&self, bucket: &str, key: &str) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Publish an attachment and return its public media link.
    async fn upload(
        &self,
        reader: BlobReader,
        bucket: &str,
        key: &str,
        content_length: Option<u64>,
    ) -> StorageResult<String> {
        let start = std::time::Instant::now();

        self.check_bucket(bucket).await?;
        let size = self
            .write_object(bucket, key, content_length, reader)
            .await?;
        self.make_public(bucket, key).await?;
        let url = self.media_link(bucket, key).await?;

        tracing::debug!(
            backend = %self.backend_type(),
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Blob published"
        );

        Ok(url)
    }
}
