//! Handlers for owner-scoped short URL management.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::pagination::ListParams;
use crate::api::dto::url::{
    CreateUrlRequest, CreateUrlResponse, UpdateUrlRequest, UrlListResponse, UrlResponse,
};
use crate::api::middleware::auth::OwnerId;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL owned by the authenticated caller.
///
/// # Endpoint
///
/// `POST /api/urls`
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/some/page" }
/// ```
///
/// # Errors
///
/// - 400 if `long_url` is missing, empty, too long, or not an http(s) URL
/// - 500 if no unique code could be allocated
pub async fn create_url_handler(
    State(state): State<AppState>,
    Extension(OwnerId(owner_id)): Extension<OwnerId>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreateUrlResponse>), AppError> {
    payload.validate()?;

    let url = state
        .url_service
        .create_short_url(owner_id, &payload.long_url)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUrlResponse {
            id: url.id,
            short_url: state.short_url(&url.short_code),
            short_code: url.short_code,
        }),
    ))
}

/// Lists the caller's short URLs, newest first.
///
/// # Endpoint
///
/// `GET /api/urls?limit=20&offset=0`
pub async fn list_urls_handler(
    State(state): State<AppState>,
    Extension(OwnerId(owner_id)): Extension<OwnerId>,
    Query(params): Query<ListParams>,
) -> Result<Json<UrlListResponse>, AppError> {
    let (limit, offset) = params.limit_offset();

    let urls = state
        .url_service
        .get_paginated_urls(owner_id, limit, offset)
        .await?;

    let items = urls
        .into_iter()
        .map(|url| {
            let short_url = state.short_url(&url.short_code);
            UrlResponse::new(url, short_url)
        })
        .collect();

    Ok(Json(UrlListResponse {
        items,
        limit,
        offset,
    }))
}

/// Replaces the destination of one of the caller's short URLs.
///
/// # Endpoint
///
/// `PATCH /api/urls/{id}`
///
/// # Errors
///
/// - 400 for a malformed id or destination
/// - 401 if the caller does not own the short URL
/// - 404 if no short URL has this id
pub async fn update_url_handler(
    State(state): State<AppState>,
    Extension(OwnerId(owner_id)): Extension<OwnerId>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUrlRequest>,
) -> Result<Json<UrlResponse>, AppError> {
    let id = parse_id(&id)?;
    payload.validate()?;

    let url = state
        .url_service
        .update_url(id, owner_id, &payload.long_url)
        .await?;
    let short_url = state.short_url(&url.short_code);

    Ok(Json(UrlResponse::new(url, short_url)))
}

/// Deletes one of the caller's short URLs.
///
/// # Endpoint
///
/// `DELETE /api/urls/{id}` → 204 No Content
pub async fn delete_url_handler(
    State(state): State<AppState>,
    Extension(OwnerId(owner_id)): Extension<OwnerId>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;

    state.url_service.delete_url(id, owner_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| {
        AppError::bad_request(
            "Invalid short URL id",
            json!({ "field": "id", "value": raw }),
        )
    })
}
