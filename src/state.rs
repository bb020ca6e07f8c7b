//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AuthService, UrlService};

/// Handles to the services built at startup.
///
/// Cloned per request; every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    pub auth_service: Arc<AuthService>,
    /// Prefix for `short_url` values in responses, without a trailing slash.
    pub base_url: Arc<str>,
}

impl AppState {
    pub fn new(
        url_service: Arc<UrlService>,
        auth_service: Arc<AuthService>,
        base_url: &str,
    ) -> Self {
        Self {
            url_service,
            auth_service,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// Builds the public URL for a short code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.base_url, short_code)
    }
}
