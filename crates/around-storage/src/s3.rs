use crate::keys::validate_key;
use crate::traits::{BlobReader, BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, ObjectCannedAcl};
use aws_sdk_s3::Client;
use bytes::Bytes;
use tokio::io::AsyncReadExt;

// Objects above this size go through a multipart upload. Parts must be at
// least 5MB except the last one.
const MULTIPART_THRESHOLD: u64 = 5 * 1024 * 1024;
const PART_SIZE: usize = 5 * 1024 * 1024;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(region.clone()));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config.clone())
            .load()
            .await;

        let client = if let Some(ref endpoint) = endpoint_url {
            let mut s3_config_builder = aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .endpoint_url(endpoint)
                .region(config.region().cloned())
                .retry_config(retry_config);
            if let Some(provider) = config.credentials_provider() {
                s3_config_builder = s3_config_builder.credentials_provider(provider);
            }
            // Path-style addressing is required by MinIO and most S3-compatible providers
            s3_config_builder = s3_config_builder.force_path_style(true);

            Client::from_conf(s3_config_builder.build())
        } else {
            Client::new(&config)
        };

        Ok(S3Storage {
            client,
            region,
            endpoint_url,
        })
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style on the endpoint: {endpoint}/{bucket}/{key}
    fn generate_url(&self, bucket: &str, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, bucket, key)
        } else {
            format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, key)
        }
    }

    async fn put_single(&self, bucket: &str, key: &str, mut reader: BlobReader) -> StorageResult<u64> {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to read from stream: {}", e)))?;

        let size = buffer.len() as u64;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(Bytes::from(buffer)))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    "S3 put_object failed"
                );
                StorageError::WriteFailed(e.to_string())
            })?;

        Ok(size)
    }

    async fn put_multipart(
        &self,
        bucket: &str,
        key: &str,
        mut reader: BlobReader,
    ) -> StorageResult<(u64, i32)> {
        let create_result = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    "Failed to create multipart upload"
                );
                StorageError::WriteFailed(e.to_string())
            })?;

        let upload_id = create_result
            .upload_id()
            .ok_or_else(|| StorageError::WriteFailed("No upload ID returned from S3".to_string()))?
            .to_string();

        let mut part_number = 1i32;
        let mut parts = Vec::new();
        let mut part_buffer = vec![0u8; PART_SIZE];
        let mut total_size = 0u64;

        let result: StorageResult<()> = async {
            loop {
                let mut bytes_in_part = 0usize;
                while bytes_in_part < PART_SIZE {
                    let bytes_read = reader
                        .read(&mut part_buffer[bytes_in_part..])
                        .await
                        .map_err(|e| {
                            StorageError::WriteFailed(format!("Failed to read from stream: {}", e))
                        })?;
                    if bytes_read == 0 {
                        break;
                    }
                    bytes_in_part += bytes_read;
                }

                if bytes_in_part == 0 {
                    break;
                }

                total_size += bytes_in_part as u64;

                let part_body = ByteStream::from(Bytes::copy_from_slice(&part_buffer[..bytes_in_part]));

                let upload_part_result = self
                    .client
                    .upload_part()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .part_number(part_number)
                    .body(part_body)
                    .send()
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            error = %e,
                            bucket = %bucket,
                            key = %key,
                            part_number = part_number,
                            "Failed to upload part"
                        );
                        StorageError::WriteFailed(e.to_string())
                    })?;

                let etag = upload_part_result
                    .e_tag()
                    .ok_or_else(|| {
                        StorageError::WriteFailed(format!("No ETag returned for part {}", part_number))
                    })?
                    .to_string();

                parts.push(
                    CompletedPart::builder()
                        .part_number(part_number)
                        .e_tag(etag)
                        .build(),
                );

                part_number += 1;

                if bytes_in_part < PART_SIZE {
                    break;
                }
            }

            let completed = CompletedMultipartUpload::builder()
                .set_parts(Some(parts))
                .build();

            self.client
                .complete_multipart_upload()
                .bucket(bucket)
                .key(key)
                .upload_id(&upload_id)
                .multipart_upload(completed)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %bucket,
                        key = %key,
                        "Failed to complete multipart upload"
                    );
                    StorageError::WriteFailed(e.to_string())
                })?;

            Ok(())
        }
        .await;

        if let Err(err) = result {
            // Incomplete uploads keep their parts billed until aborted
            if let Err(abort_err) = self
                .client
                .abort_multipart_upload()
                .bucket(bucket)
                .key(key)
                .upload_id(&upload_id)
                .send()
                .await
            {
                tracing::warn!(
                    error = %abort_err,
                    bucket = %bucket,
                    key = %key,
                    "Failed to abort multipart upload"
                );
            }
            return Err(err);
        }

        Ok((total_size, part_number - 1))
    }
}

#[async_trait]
impl BlobStore for S3Storage {
    async fn check_bucket(&self, bucket: &str) -> StorageResult<()> {
        validate_key(bucket)?;

        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, bucket = %bucket, "S3 bucket check failed");
                StorageError::Unavailable(format!("bucket {}: {}", bucket, e))
            })?;

        Ok(())
    }

    async fn write_object(
        &self,
        bucket: &str,
        key: &str,
        content_length: Option<u64>,
        reader: BlobReader,
    ) -> StorageResult<u64> {
        validate_key(key)?;
        let start = std::time::Instant::now();

        let use_multipart = content_length
            .map(|len| len > MULTIPART_THRESHOLD)
            .unwrap_or(true);

        let size = if use_multipart {
            let (size, parts) = self.put_multipart(bucket, key, reader).await?;
            tracing::info!(
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                parts = parts,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 multipart upload successful"
            );
            size
        } else {
            let size = self.put_single(bucket, key, reader).await?;
            tracing::info!(
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload successful"
            );
            size
        };

        Ok(size)
    }

    async fn make_public(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.client
            .put_object_acl()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, bucket = %bucket, key = %key, "S3 put_object_acl failed");
                StorageError::AclFailed(e.to_string())
            })?;

        Ok(())
    }

    async fn media_link(&self, bucket: &str, key: &str) -> StorageResult<String> {
        self.client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, bucket = %bucket, key = %key, "S3 head_object failed");
                StorageError::LinkFailed(e.to_string())
            })?;

        Ok(self.generate_url(bucket, key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
