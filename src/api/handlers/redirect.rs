//! Handlers for public short code resolution.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::api::dto::url::ResolveResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination.
///
/// # Endpoint
///
/// `GET /{code}` → `302 Found` with `Location` set to the long URL
///
/// Lookup goes through the cache first and falls back to the store; every
/// successful resolution counts one redirect.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown or malformed.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state.url_service.get_original_url(&code).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, long_url)]))
}

/// Resolves a short code without redirecting.
///
/// # Endpoint
///
/// `GET /api/resolve/{code}`
///
/// Counts as a redirect, like [`redirect_handler`].
pub async fn resolve_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ResolveResponse>, AppError> {
    let long_url = state.url_service.get_original_url(&code).await?;

    Ok(Json(ResolveResponse {
        short_code: code,
        long_url,
    }))
}
