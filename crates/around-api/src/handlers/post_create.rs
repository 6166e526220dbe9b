use crate::auth::CallerIdentity;
use crate::constants::{FIELD_IMAGE, FIELD_LAT, FIELD_LON, FIELD_MESSAGE};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use around_core::models::{CreatedPost, Location};
use around_core::AppError;
use around_services::{IncomingPost, MediaAttachment};
use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use utoipa::ToSchema;

/// Multipart form accepted by `create_post` (documentation only).
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct CreatePostForm {
    message: String,
    lat: f64,
    lon: f64,
    /// Attachment; the file name suffix decides the media type.
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/v1/post",
    tag = "posts",
    request_body(content = CreatePostForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Post created", body = CreatedPost),
        (status = 400, description = "Missing or malformed field", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 502, description = "Storage, annotation or index failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, caller, multipart), fields(user = %caller.username))]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    caller: CallerIdentity,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedPost>), HttpAppError> {
    let mut message = String::new();
    let mut lat: Option<String> = None;
    let mut lon: Option<String> = None;
    let mut media: Option<MediaAttachment> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FIELD_MESSAGE => message = read_text(field).await?,
            FIELD_LAT => lat = Some(read_text(field).await?),
            FIELD_LON => lon = Some(read_text(field).await?),
            FIELD_IMAGE => media = Some(spool_attachment(field).await?),
            _ => {}
        }
    }

    let location = Location::new(
        parse_coordinate(FIELD_LAT, lat)?,
        parse_coordinate(FIELD_LON, lon)?,
    );

    let created = state
        .ingestion
        .ingest(IncomingPost {
            user: caller.username,
            message,
            location,
            media,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read field {}: {}", name, e)))
}

/// Stream the file part to a temp file so later stages can re-read it.
async fn spool_attachment(mut field: Field<'_>) -> Result<MediaAttachment, AppError> {
    let filename = field.file_name().unwrap_or_default().to_string();

    let (file, path) = NamedTempFile::new()?.into_parts();
    let mut file = tokio::fs::File::from_std(file);
    let mut size: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?
    {
        size += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    tracing::debug!(filename = %filename, size_bytes = size, "Attachment received");

    Ok(MediaAttachment::new(filename, path, size))
}

fn parse_coordinate(name: &str, value: Option<String>) -> Result<f64, AppError> {
    let value = value.ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))?;
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::BadRequest(format!("{} must be a number, got {:?}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("lat", Some(" 37.5 ".into())).unwrap(), 37.5);
        assert!(matches!(
            parse_coordinate("lat", None),
            Err(AppError::BadRequest(ref msg)) if msg == "lat is required"
        ));
        assert!(parse_coordinate("lon", Some("east".into())).is_err());
        assert!(parse_coordinate("lon", Some("NaN".into())).is_err());
    }
}
