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

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClusterParams {
    /// Numeric document field to threshold, e.g. `face`
    #[param(value_type = String)]
    pub term: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/cluster",
    tag = "posts",
    params(ClusterParams),
    responses(
        (status = 200, description = "Posts whose term is at least the threshold", body = Vec<PostResponse>),
        (status = 400, description = "Missing term", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Stored post could not be decoded", body = ErrorResponse),
        (status = 502, description = "Index query failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, caller), fields(user = %caller.username))]
pub async fn cluster_posts(
    State(state): State<Arc<AppState>>,
    caller: CallerIdentity,
    Query(params): Query<ClusterParams>,
) -> Result<Json<Vec<PostResponse>>, HttpAppError> {
    let term = params
        .term
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty())
        .ok_or_else(|| AppError::BadRequest("term is required".to_string()))?;

    let posts = state.queries.cluster_by_term(&term).await?;

    Ok(Json(posts))
}
