//! Error types module
//!
//! All failures that can surface from a request are unified under [`AppError`].
//! Leaf crates (storage, index, annotation) keep their own error enums and
//! convert into `AppError` at their boundary.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for upstream failures that may clear on retry
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INDEX_WRITE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Image is not available")]
    ImageMissing,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Blob write failed: {0}")]
    WriteFailed(String),

    #[error("Failed to grant public read access: {0}")]
    AclFailed(String),

    #[error("Failed to annotate the image: {0}")]
    AnnotationFailed(String),

    #[error("Failed to save post to index: {0}")]
    IndexWriteFailed(String),

    #[error("Failed to query index: {0}")]
    IndexQueryFailed(String),

    #[error("Failed to parse post object: {0}")]
    SerializationFailed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationFailed(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::BadRequest(_) => (400, "BAD_REQUEST", false, LogLevel::Debug),
        AppError::ImageMissing => (400, "IMAGE_MISSING", false, LogLevel::Debug),
        AppError::StorageUnavailable(_) => (502, "STORAGE_UNAVAILABLE", true, LogLevel::Error),
        AppError::WriteFailed(_) => (502, "WRITE_FAILED", true, LogLevel::Error),
        AppError::AclFailed(_) => (502, "ACL_FAILED", true, LogLevel::Error),
        AppError::AnnotationFailed(_) => (502, "ANNOTATION_FAILED", true, LogLevel::Warn),
        AppError::IndexWriteFailed(_) => (502, "INDEX_WRITE_FAILED", true, LogLevel::Error),
        AppError::IndexQueryFailed(_) => (502, "INDEX_QUERY_FAILED", false, LogLevel::Error),
        AppError::SerializationFailed(_) => (500, "SERIALIZATION_FAILED", false, LogLevel::Error),
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::BadRequest(_) => "BadRequest",
            AppError::ImageMissing => "ImageMissing",
            AppError::StorageUnavailable(_) => "StorageUnavailable",
            AppError::WriteFailed(_) => "WriteFailed",
            AppError::AclFailed(_) => "AclFailed",
            AppError::AnnotationFailed(_) => "AnnotationFailed",
            AppError::IndexWriteFailed(_) => "IndexWriteFailed",
            AppError::IndexQueryFailed(_) => "IndexQueryFailed",
            AppError::SerializationFailed(_) => "SerializationFailed",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Full internal message, including the backend's own wording.
    pub fn detailed_message(&self) -> String {
        self.to_string()
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::ImageMissing => "Image is not available".to_string(),
            AppError::StorageUnavailable(_) => "Media storage is not available".to_string(),
            AppError::WriteFailed(_) => "Failed to store media".to_string(),
            AppError::AclFailed(_) => "Failed to publish media".to_string(),
            AppError::AnnotationFailed(_) => "Failed to annotate the image".to_string(),
            AppError::IndexWriteFailed(_) => "Failed to save post".to_string(),
            AppError::IndexQueryFailed(ref msg) => format!("Failed to query index: {}", msg),
            AppError::SerializationFailed(ref msg) => {
                format!("Failed to parse post object: {}", msg)
            }
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
