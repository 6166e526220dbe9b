use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::media::MediaKind;

/// Identifier shared by a post's blob object and its index document.
pub type PostId = Uuid;

/// Generate a fresh post identifier. Called exactly once per ingestion.
pub fn new_post_id() -> PostId {
    Uuid::new_v4()
}

/// Geographic position of a post.
///
/// The ranges mirror what the index's geo-point field accepts; the ingestion
/// pipeline itself does not enforce them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Range validation lets NaN through, so finiteness is checked apart.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A post as stored in the document index.
///
/// `face` is `None` until the annotation step has evaluated the attachment;
/// `Some(0.0)` means "evaluated, no face".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub user: String,
    pub message: String,
    pub location: Location,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default)]
    pub media_type: MediaKind,
    #[serde(default)]
    pub face: Option<f64>,
}

impl Post {
    /// Start a post from parsed request data. `url`, `type` and `face` are
    /// filled in by later pipeline stages.
    pub fn new(user: impl Into<String>, message: impl Into<String>, location: Location) -> Self {
        Self {
            user: user.into(),
            message: message.into(),
            location,
            url: String::new(),
            media_type: MediaKind::Unknown,
            face: None,
        }
    }
}

/// Post record returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub user: String,
    pub message: String,
    pub location: Location,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: MediaKind,
    /// Face confidence in [0,1]; 0 when the attachment was not evaluated.
    pub face: f64,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            user: post.user,
            message: post.message,
            location: post.location,
            url: post.url,
            media_type: post.media_type,
            face: post.face.unwrap_or_default(),
        }
    }
}

/// Body returned after a post has been created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedPost {
    #[schema(value_type = uuid::Uuid)]
    pub id: PostId,
    pub url: String,
}
