//! Around HTTP API
//!
//! Axum routes for creating posts and querying them by location or by an
//! annotation score, plus the process bootstrap used by the binary.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
