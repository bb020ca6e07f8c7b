//! In-process cache implementation.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

struct CachedUrl {
    long_url: String,
    expires_at: Instant,
}

/// Process-local cache with per-entry expiry.
///
/// Expired entries are dropped lazily on lookup. Suitable for a single
/// instance; multiple instances each keep their own copy, so an update made
/// through one instance is only invalidated there.
pub struct MemoryCache {
    entries: DashMap<String, CachedUrl>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Number of entries currently held, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(short_code)
            && entry.expires_at > now
        {
            debug!(short_code, "Cache HIT");
            return Ok(Some(entry.long_url.clone()));
        }

        self.entries
            .remove_if(short_code, |_, entry| entry.expires_at <= now);
        debug!(short_code, "Cache MISS");
        Ok(None)
    }

    async fn set_url(
        &self,
        short_code: &str,
        long_url: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let ttl = ttl.unwrap_or(self.default_ttl);

        self.entries.insert(
            short_code.to_string(),
            CachedUrl {
                long_url: long_url.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        if self.entries.remove(short_code).is_some() {
            debug!(short_code, "Cache INVALIDATE");
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
