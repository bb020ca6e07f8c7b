//! Handler for per-URL analytics.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::dto::analytics::AnalyticsResponse;
use crate::api::middleware::auth::OwnerId;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the redirect count of a short URL owned by the caller.
///
/// # Endpoint
///
/// `GET /api/analytics/{code}`
///
/// # Errors
///
/// - 400 if the code is malformed
/// - 401 if the caller does not own the short URL
/// - 404 if the code is unknown
pub async fn analytics_handler(
    State(state): State<AppState>,
    Extension(OwnerId(owner_id)): Extension<OwnerId>,
    Path(code): Path<String>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let redirects = state.url_service.get_analytics(&code, owner_id).await?;

    Ok(Json(AnalyticsResponse {
        short_code: code,
        redirects,
    }))
}
