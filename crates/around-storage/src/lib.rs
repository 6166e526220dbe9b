//! Around Storage Library
//!
//! Blob storage for post attachments. A [`BlobStore`] publishes one object per
//! post: it checks the bucket, streams the content, grants public read access
//! and returns the object's public media link.
//!
//! # Object keys
//!
//! The object key is the post identifier, so a blob and its index document can
//! always be correlated. Keys and bucket names must not contain `..` or a
//! leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use around_core::StorageBackend;
pub use factory::create_blob_store;
pub use keys::object_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{BlobReader, BlobStore, StorageError, StorageResult};
