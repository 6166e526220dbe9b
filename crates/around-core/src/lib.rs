//! Around Core Library
//!
//! Domain model, media classification, configuration and the error taxonomy
//! shared by every Around crate.

pub mod config;
pub mod error;
pub mod geo;
pub mod media;
pub mod models;

// Re-export commonly used types
pub use config::{
    AnnotationConfig, Config, IndexBackend, IndexConfig, SearchConfig, StorageBackend,
    StorageConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use media::{classify_suffix, file_suffix, MediaKind};
