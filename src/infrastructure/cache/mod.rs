//! Read-through cache for short code resolution.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - Shared Redis-backed cache
//! - [`MemoryCache`] - Process-local cache with per-entry expiry
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! The cache is never authoritative. Every entry may be dropped at any time and
//! the service falls back to the store.

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
