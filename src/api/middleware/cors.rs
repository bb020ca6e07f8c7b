//! Cross-origin access for browser clients.

use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// Matches any origin. Cannot be combined with credentials.
pub const ANY_ORIGIN: &str = "*";

/// CORS settings, built from configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsOptions {
    /// Exact origins allowed to call the API, or [`ANY_ORIGIN`].
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    /// How long browsers may cache a preflight answer.
    pub max_age: Duration,
}

impl Default for CorsOptions {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
            max_age: Duration::from_secs(300),
        }
    }
}

/// Builds the CORS layer for the whole router.
///
/// Preflight requests are answered here, before authentication runs. Origins
/// that are not valid header values are skipped with a warning. Credentials
/// are never sent alongside a wildcard origin.
pub fn layer(options: &CorsOptions) -> CorsLayer {
    let wildcard = options.allowed_origins.iter().any(|o| o == ANY_ORIGIN);

    let origins = if wildcard {
        AllowOrigin::any()
    } else {
        let list: Vec<HeaderValue> = options
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(options.allow_credentials && !wildcard)
        .max_age(options.max_age)
}
