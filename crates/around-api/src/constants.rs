/// Prefix for every authenticated route.
pub const API_PREFIX: &str = "/api/v1";

pub const OPENAPI_PATH: &str = "/api/openapi.json";
pub const DOCS_PATH: &str = "/docs";

/// Multipart field names accepted by `POST /api/v1/post`.
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_LAT: &str = "lat";
pub const FIELD_LON: &str = "lon";
pub const FIELD_IMAGE: &str = "image";
