//! DTOs for short URL endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::ShortUrl;

/// Body of `POST /api/urls`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    #[validate(length(min = 1, max = 2048, message = "long_url must be 1-2048 characters"))]
    pub long_url: String,
}

/// Body of `PATCH /api/urls/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUrlRequest {
    #[validate(length(min = 1, max = 2048, message = "long_url must be 1-2048 characters"))]
    pub long_url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUrlResponse {
    pub id: Uuid,
    pub short_code: String,
    pub short_url: String,
}

/// Full view of a short URL as returned to its owner.
#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub id: Uuid,
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub redirects: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UrlResponse {
    pub fn new(url: ShortUrl, short_url: String) -> Self {
        Self {
            id: url.id,
            short_code: url.short_code,
            short_url,
            long_url: url.long_url,
            redirects: url.redirects,
            created_at: url.created_at,
            updated_at: url.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UrlListResponse {
    pub items: Vec<UrlResponse>,
    pub limit: i64,
    pub offset: i64,
}

/// Body of `GET /api/resolve/{code}`.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub short_code: String,
    pub long_url: String,
}
