//! Around Services Layer
//!
//! Business logic between the HTTP layer and the backends: the post
//! ingestion pipeline, the query service and the face annotation client.
//! Handlers in around-api stay thin and delegate here.

pub mod annotation;
pub mod ingest;
pub mod query;

pub use annotation::{AnnotationError, FaceAnnotator, VisionFaceAnnotator};
pub use ingest::{IncomingPost, MediaAttachment, PostIngestionPipeline};
pub use query::PostQueryService;
