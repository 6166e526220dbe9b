//! Object key helpers shared by every backend.

use crate::{StorageError, StorageResult};
use around_core::models::PostId;

/// Object key for a post's attachment.
pub fn object_key(id: &PostId) -> String {
    id.to_string()
}

/// Reject keys and bucket names that could escape their namespace.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
