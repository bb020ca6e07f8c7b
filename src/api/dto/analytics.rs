//! DTO for the analytics endpoint.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub short_code: String,
    pub redirects: i64,
}
