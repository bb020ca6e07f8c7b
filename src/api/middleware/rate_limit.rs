//! Rate limiting middleware using token bucket algorithm.
//!
//! Two budgets exist: a generous one for the public redirect surface and a
//! stricter one for the authenticated API. Each comes in two flavours that
//! differ only in how the client IP is found.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Rate limiter keyed by `K`.
pub type RateLimitLayer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

const PUBLIC_PER_SECOND: u64 = 2;
const PUBLIC_BURST: u32 = 100;
const SECURE_PER_SECOND: u64 = 1;
const SECURE_BURST: u32 = 10;

fn build<K: KeyExtractor>(key: K, per_second: u64, burst: u32) -> RateLimitLayer<K> {
    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(key)
        .per_second(per_second)
        .burst_size(burst)
        .finish()
        .expect("rate limit constants are non-zero");

    GovernorLayer::new(Arc::new(governor_conf))
}

/// Creates a rate limiter for public endpoints.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// Keys on the socket peer address, so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn layer() -> RateLimitLayer<PeerIpKeyExtractor> {
    build(PeerIpKeyExtractor, PUBLIC_PER_SECOND, PUBLIC_BURST)
}

/// Creates a stricter rate limiter for authenticated endpoints.
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
pub fn secure_layer() -> RateLimitLayer<PeerIpKeyExtractor> {
    build(PeerIpKeyExtractor, SECURE_PER_SECOND, SECURE_BURST)
}

/// Public limiter for deployments behind a reverse proxy.
///
/// Reads the client IP from `X-Forwarded-For`, `X-Real-Ip` or `Forwarded`,
/// falling back to the peer address.
pub fn proxied_layer() -> RateLimitLayer<SmartIpKeyExtractor> {
    build(SmartIpKeyExtractor, PUBLIC_PER_SECOND, PUBLIC_BURST)
}

/// Authenticated-endpoint limiter for deployments behind a reverse proxy.
pub fn proxied_secure_layer() -> RateLimitLayer<SmartIpKeyExtractor> {
    build(SmartIpKeyExtractor, SECURE_PER_SECOND, SECURE_BURST)
}
