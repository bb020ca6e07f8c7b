//! Paging query parameters for owner listings.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

pub const DEFAULT_LIMIT: i64 = 20;

/// `?limit=&offset=` query parameters.
///
/// Uses `serde_with` to parse numbers from query strings. Range checks are
/// left to [`crate::application::services::UrlService::get_paginated_urls`]
/// so that every entry point reports them the same way.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub offset: Option<i64>,
}

impl ListParams {
    /// Returns `(limit, offset)` with defaults of 20 and 0 applied.
    pub fn limit_offset(&self) -> (i64, i64) {
        (
            self.limit.unwrap_or(DEFAULT_LIMIT),
            self.offset.unwrap_or(0),
        )
    }
}
