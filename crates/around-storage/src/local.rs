use crate::keys::validate_key;
use crate::traits::{BlobReader, BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Local filesystem storage implementation
///
/// Each bucket is a directory directly under `base_path`. Buckets are never
/// created implicitly: uploading into a missing bucket fails the bucket check.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory holding one directory per bucket (e.g., "/var/lib/around/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8080/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    fn bucket_path(&self, bucket: &str) -> StorageResult<PathBuf> {
        validate_key(bucket)?;
        if bucket.contains('/') {
            return Err(StorageError::InvalidKey(
                "Bucket name cannot contain '/'".to_string(),
            ));
        }
        Ok(self.base_path.join(bucket))
    }

    /// Convert bucket and key to a filesystem path with security validation
    fn key_to_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.bucket_path(bucket)?.join(key))
    }

    /// Generate public URL for file
    fn generate_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), bucket, key)
    }
}

#[async_trait]
impl BlobStore for LocalStorage {
    async fn check_bucket(&self, bucket: &str) -> StorageResult<()> {
        let path = self.bucket_path(bucket)?;

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::Unavailable(format!(
                "{} is not a directory",
                path.display()
            ))),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %path.display(),
                    bucket = %bucket,
                    "Local storage bucket check failed"
                );
                Err(StorageError::Unavailable(format!(
                    "bucket {}: {}",
                    bucket, e
                )))
            }
        }
    }

    async fn write_object(
        &self,
        bucket: &str,
        key: &str,
        _content_length: Option<u64>,
        mut reader: BlobReader,
    ) -> StorageResult<u64> {
        let path = self.key_to_path(bucket, key)?;
        let start = std::time::Instant::now();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(bytes_copied)
    }

    async fn make_public(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(bucket, key)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))
                .await
                .map_err(|e| {
                    StorageError::AclFailed(format!(
                        "Failed to set permissions on {}: {}",
                        path.display(),
                        e
                    ))
                })?;
        }

        #[cfg(not(unix))]
        {
            if !fs::try_exists(&path).await.unwrap_or(false) {
                return Err(StorageError::AclFailed(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    async fn media_link(&self, bucket: &str, key: &str) -> StorageResult<String> {
        let path = self.key_to_path(bucket, key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::LinkFailed(format!(
                "{} does not exist",
                path.display()
            )));
        }

        Ok(self.generate_url(bucket, key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
