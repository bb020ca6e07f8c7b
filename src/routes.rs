//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`              - Short URL redirect (public)
//! - `GET  /health`              - Health check: store and cache (public)
//! - `GET  /api/resolve/{code}`  - Resolve without redirecting (public)
//! - `/api/*`                    - Owner-scoped REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Timeout** - Per-request deadline, 408 on expiry
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **CORS** - Configured origins, preflight answered before authentication
//! - **Authentication** - Bearer token on `/api/*` except resolve
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler, resolve_handler};
use crate::api::middleware::cors::{self, CorsOptions};
use crate::api::middleware::{auth, rate_limit, timeout, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// How rate limiting finds the client IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimiting {
    /// No rate limiting. Used by tests, where requests carry no peer address.
    Disabled,
    /// Key on the socket peer address.
    PeerIp,
    /// Key on forwarding headers set by a trusted reverse proxy.
    Proxied,
}

impl RateLimiting {
    pub fn for_deployment(behind_proxy: bool) -> Self {
        if behind_proxy {
            Self::Proxied
        } else {
            Self::PeerIp
        }
    }
}

/// Builds the router with every route and middleware except path normalization.
pub fn router(
    state: AppState,
    request_timeout: Duration,
    rate_limiting: RateLimiting,
    cors_options: &CorsOptions,
) -> Router {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let public = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .route("/api/resolve/{code}", get(resolve_handler));

    let (api_router, public) = match rate_limiting {
        RateLimiting::Disabled => (api_router, public),
        RateLimiting::PeerIp => (
            api_router.layer(rate_limit::secure_layer()),
            public.layer(rate_limit::layer()),
        ),
        RateLimiting::Proxied => (
            api_router.layer(rate_limit::proxied_secure_layer()),
            public.layer(rate_limit::proxied_layer()),
        ),
    };

    Router::new()
        .merge(public)
        .nest("/api", api_router)
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            request_timeout,
            timeout::layer,
        ))
        .layer(cors::layer(cors_options))
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `request_timeout` - deadline applied to every request
/// - `cors_options` - origins allowed to call the API from a browser
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(
    state: AppState,
    request_timeout: Duration,
    cors_options: &CorsOptions,
    behind_proxy: bool,
) -> NormalizePath<Router> {
    let router = router(
        state,
        request_timeout,
        RateLimiting::for_deployment(behind_proxy),
        cors_options,
    );

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
