use crate::auth::CallerIdentity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use around_core::models::PostResponse;
use around_core::AppError;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

/// Raw query string; values are parsed by the handler so malformed input
/// renders as an `ErrorResponse`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Latitude of the search center
    #[param(value_type = f64)]
    pub lat: Option<String>,
    /// Longitude of the search center
    #[param(value_type = f64)]
    pub lon: Option<String>,
    /// Radius in kilometers (defaults to 200)
    #[param(value_type = Option<f64>)]
    pub range: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/search",
    tag = "posts",
    params(SearchParams),
    responses(
        (status = 200, description = "Posts within the radius", body = Vec<PostResponse>),
        (status = 400, description = "Missing or malformed parameter", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Stored post could not be decoded", body = ErrorResponse),
        (status = 502, description = "Index query failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, caller), fields(user = %caller.username))]
pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    caller: CallerIdentity,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PostResponse>>, HttpAppError> {
    let lat = required_number("lat", params.lat)?;
    let lon = required_number("lon", params.lon)?;
    let range_km = params
        .range
        .map(|range| parse_number("range", &range))
        .transpose()?;

    if let Some(range_km) = range_km {
        if range_km <= 0.0 {
            return Err(AppError::BadRequest("range must be greater than 0".to_string()).into());
        }
    }

    let posts = state.queries.search_by_location(lat, lon, range_km).await?;

    Ok(Json(posts))
}

fn parse_number(name: &str, value: &str) -> Result<f64, AppError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::BadRequest(format!("{} must be a number, got {:?}", name, value)))
}

fn required_number(name: &str, value: Option<String>) -> Result<f64, AppError> {
    let value = value.ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))?;
    parse_number(name, &value)
}
