//! Short URL issuance, resolution and owner-gated mutation.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::{StoreError, UrlRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{
    CodeGenerator, RandomCodeGenerator, is_reserved_code, validate_short_code,
};
use crate::utils::url_validator::validate_long_url;

/// Largest page size accepted by [`UrlService::get_paginated_urls`].
pub const MAX_PAGE_SIZE: i64 = 100;

/// Tunables for [`UrlService`], built from configuration at startup.
#[derive(Debug, Clone, Copy)]
pub struct UrlServiceOptions {
    /// Upper bound on generate-and-persist attempts per creation. Values below 1 mean 1.
    pub max_retries: i64,
    /// Lifetime of cache entries written on the resolution path.
    pub cache_ttl: Duration,
}

impl Default for UrlServiceOptions {
    fn default() -> Self {
        Self {
            max_retries: 5,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Core service for short URLs.
///
/// The store is the only arbiter of short code uniqueness; the existence check
/// made before each insert just avoids a doomed round trip. The cache is
/// consulted only when resolving and is invalidated on every update and delete.
///
/// The service holds no mutable state of its own, so one instance is shared
/// by all request handlers.
pub struct UrlService<
    R: UrlRepository + ?Sized = dyn UrlRepository,
    G: CodeGenerator = RandomCodeGenerator,
> {
    repository: Arc<R>,
    generator: G,
    cache: Arc<dyn CacheService>,
    max_retries: u32,
    cache_ttl: Duration,
}

impl<R: UrlRepository + ?Sized, G: CodeGenerator> UrlService<R, G> {
    /// Creates a new URL service.
    pub fn new(
        repository: Arc<R>,
        generator: G,
        cache: Arc<dyn CacheService>,
        options: UrlServiceOptions,
    ) -> Self {
        let max_retries = u32::try_from(options.max_retries.max(1)).unwrap_or(u32::MAX);

        Self {
            repository,
            generator,
            cache,
            max_retries,
            cache_ttl: options.cache_ttl,
        }
    }

    /// Effective number of creation attempts.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Creates a short URL owned by `owner_id`.
    ///
    /// # Retry policy
    ///
    /// Up to `max_retries` candidates are tried. A candidate is skipped when it
    /// names a fixed route, when the store already holds it, or when the insert loses a race and the store
    /// reports a uniqueness violation. Any other failure ends the call.
    ///
    /// Dropping the returned future stops the loop at its next await point;
    /// nothing is persisted for an attempt that had not reached the store.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `long_url` is invalid (no code is generated)
    /// - [`AppError::Internal`] if every attempt collided, the random source
    ///   failed, or the store failed
    pub async fn create_short_url(
        &self,
        owner_id: Uuid,
        long_url: &str,
    ) -> Result<ShortUrl, AppError> {
        let long_url = validate_long_url(long_url).map_err(|e| {
            AppError::bad_request(e.to_string(), json!({ "field": "long_url" }))
        })?;

        for attempt in 1..=self.max_retries {
            let short_code = self.generator.generate().map_err(|e| {
                AppError::internal("Short code generation failed", json!({ "reason": e.to_string() }))
            })?;

            if is_reserved_code(&short_code) {
                debug!(attempt, %short_code, "Short code is reserved");
                continue;
            }

            if self.repository.exists_by_code(&short_code).await? {
                debug!(attempt, %short_code, "Short code already taken");
                continue;
            }

            let new_url = NewShortUrl::new(owner_id, short_code, long_url.clone());

            match self.repository.save(new_url).await {
                Ok(saved) => {
                    info!(
                        id = %saved.id,
                        short_code = %saved.short_code,
                        %owner_id,
                        attempt,
                        "Short URL created"
                    );
                    return Ok(saved);
                }
                Err(StoreError::UniqueViolation { constraint }) => {
                    debug!(attempt, %constraint, "Lost insert race for short code");
                }
                Err(e) => return Err(e.into()),
            }
        }

        error!(
            %owner_id,
            attempts = self.max_retries,
            "Exhausted short code retries"
        );

        Err(AppError::internal(
            "Failed to generate unique short code",
            json!({ "attempts": self.max_retries }),
        ))
    }

    /// Resolves a short code to its long URL and records the redirect.
    ///
    /// The cache is read first. On a miss (or a cache failure) the store is
    /// queried and the cache is populated for `cache_ttl`. The redirect counter
    /// is bumped after every successful resolution; a failed bump is logged
    /// and does not fail the read.
    ///
    /// Codes that could never have been issued are reported as not found
    /// without touching the cache or the store.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no short URL has this code
    /// - [`AppError::Internal`] if the store lookup fails
    pub async fn get_original_url(&self, short_code: &str) -> Result<String, AppError> {
        if validate_short_code(short_code).is_err() {
            return Err(not_found_code(short_code));
        }

        match self.cache.get_url(short_code).await {
            Ok(Some(long_url)) if !long_url.is_empty() => {
                self.record_redirect(short_code).await;
                return Ok(long_url);
            }
            Ok(_) => {}
            Err(e) => warn!(short_code, error = %e, "Cache lookup failed, using store"),
        }

        let url = self
            .repository
            .find_by_code(short_code)
            .await?
            .ok_or_else(|| not_found_code(short_code))?;

        if let Err(e) = self
            .cache
            .set_url(short_code, &url.long_url, Some(self.cache_ttl))
            .await
        {
            warn!(short_code, error = %e, "Failed to populate cache");
        }

        self.record_redirect(short_code).await;

        Ok(url.long_url)
    }

    /// Changes the destination of a short URL owned by `owner_id`.
    ///
    /// The cached mapping is removed once the store holds the new value, so the
    /// next resolution reads through to the store.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if `id` does not exist
    /// - [`AppError::Unauthorized`] if `owner_id` is not the owner
    /// - [`AppError::Validation`] if `new_long_url` is invalid
    pub async fn update_url(
        &self,
        id: Uuid,
        owner_id: Uuid,
        new_long_url: &str,
    ) -> Result<ShortUrl, AppError> {
        let mut url = self.owned_by_id(id, owner_id).await?;

        let new_long_url = validate_long_url(new_long_url).map_err(|e| {
            AppError::bad_request(e.to_string(), json!({ "field": "long_url" }))
        })?;

        url.change_long_url(new_long_url);
        let updated = self.repository.update(&url).await?;

        self.invalidate(&updated.short_code).await;

        info!(%id, short_code = %updated.short_code, "Short URL updated");
        Ok(updated)
    }

    /// Deletes a short URL owned by `owner_id` and drops its cached mapping.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if `id` does not exist
    /// - [`AppError::Unauthorized`] if `owner_id` is not the owner
    pub async fn delete_url(&self, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        let url = self.owned_by_id(id, owner_id).await?;

        self.repository.delete(id, owner_id).await?;
        self.invalidate(&url.short_code).await;

        info!(%id, short_code = %url.short_code, "Short URL deleted");
        Ok(())
    }

    /// Returns the redirect count of a short URL, read from the store.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `short_code` is malformed
    /// - [`AppError::NotFound`] if no short URL has this code
    /// - [`AppError::Unauthorized`] if `requester_id` is not the owner
    pub async fn get_analytics(
        &self,
        short_code: &str,
        requester_id: Uuid,
    ) -> Result<i64, AppError> {
        validate_short_code(short_code).map_err(|reason| {
            AppError::bad_request(reason, json!({ "field": "short_code" }))
        })?;

        let url = self
            .repository
            .find_by_code(short_code)
            .await?
            .ok_or_else(|| not_found_code(short_code))?;

        ensure_owner(&url, requester_id)?;

        Ok(url.redirects)
    }

    /// Lists the short URLs of `owner_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `limit` is outside `1..=100` or
    /// `offset` is negative.
    pub async fn get_paginated_urls(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ShortUrl>, AppError> {
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::bad_request(
                format!("limit must be between 1 and {MAX_PAGE_SIZE}"),
                json!({ "field": "limit", "value": limit }),
            ));
        }
        if offset < 0 {
            return Err(AppError::bad_request(
                "offset must not be negative",
                json!({ "field": "offset", "value": offset }),
            ));
        }

        Ok(self
            .repository
            .find_by_owner(owner_id, limit, offset)
            .await?)
    }

    /// Checks that the store answers.
    pub async fn store_health(&self) -> Result<(), AppError> {
        Ok(self.repository.ping().await?)
    }

    /// Checks that the cache backend answers.
    pub async fn cache_health(&self) -> bool {
        self.cache.health_check().await
    }

    async fn owned_by_id(&self, id: Uuid, owner_id: Uuid) -> Result<ShortUrl, AppError> {
        let url = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "id": id })))?;

        ensure_owner(&url, owner_id)?;

        Ok(url)
    }

    async fn record_redirect(&self, short_code: &str) {
        if let Err(e) = self.repository.increment_redirects(short_code).await {
            warn!(short_code, error = %e, "Failed to record redirect");
        }
    }

    async fn invalidate(&self, short_code: &str) {
        if let Err(e) = self.cache.invalidate(short_code).await {
            warn!(
                short_code,
                error = %e,
                "Cache invalidation failed, entry expires with its TTL"
            );
        }
    }
}

fn ensure_owner(url: &ShortUrl, owner_id: Uuid) -> Result<(), AppError> {
    if url.is_owned_by(owner_id) {
        return Ok(());
    }

    Err(AppError::unauthorized(
        "You do not own this short URL",
        json!({ "short_code": url.short_code }),
    ))
}

fn not_found_code(short_code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "short_code": short_code }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockUrlRepository, StoreResult};
    use crate::infrastructure::cache::{CacheError, MemoryCache, MockCacheService, NullCache};
    use crate::infrastructure::persistence::InMemoryUrlRepository;
    use crate::utils::code_generator::{GeneratorError, MockCodeGenerator};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Emits a fixed sequence of codes, then fails.
    struct ScriptedGenerator(Mutex<VecDeque<String>>);

    impl ScriptedGenerator {
        fn new(codes: &[&str]) -> Self {
            Self(Mutex::new(codes.iter().map(|c| c.to_string()).collect()))
        }
    }

    impl CodeGenerator for ScriptedGenerator {
        fn generate(&self) -> Result<String, GeneratorError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GeneratorError("script exhausted".to_string()))
        }
    }

    fn test_url(owner_id: Uuid, code: &str, long_url: &str) -> ShortUrl {
        ShortUrl {
            id: Uuid::new_v4(),
            owner_id,
            short_code: code.to_string(),
            long_url: long_url.to_string(),
            redirects: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn memory_service() -> (
        UrlService<InMemoryUrlRepository, RandomCodeGenerator>,
        Arc<InMemoryUrlRepository>,
        Arc<MemoryCache>,
    ) {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(300)));
        let service = UrlService::new(
            repo.clone(),
            RandomCodeGenerator::new(7),
            cache.clone(),
            UrlServiceOptions::default(),
        );
        (service, repo, cache)
    }

    #[tokio::test]
    async fn test_create_then_resolve_round_trip() {
        let (service, _, _) = memory_service();
        let owner = Uuid::new_v4();

        let created = service
            .create_short_url(owner, "https://example.com/a")
            .await
            .unwrap();

        assert_eq!(created.short_code.len(), 7);
        assert!(created.short_code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(created.owner_id, owner);

        let resolved = service.get_original_url(&created.short_code).await.unwrap();
        assert_eq!(resolved, "https://example.com/a");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_url_without_generating() {
        let mut generator = MockCodeGenerator::new();
        generator.expect_generate().never();
        let mut repo = MockUrlRepository::new();
        repo.expect_exists_by_code().never();
        repo.expect_save().never();

        let service = UrlService::new(
            Arc::new(repo),
            generator,
            Arc::new(NullCache::new()),
            UrlServiceOptions::default(),
        );

        for bad in ["", "ftp://example.com", "not a url", "javascript:alert(1)"] {
            let err = service
                .create_short_url(Uuid::new_v4(), bad)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_create_skips_codes_already_in_store() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let owner = Uuid::new_v4();
        repo.save(NewShortUrl::new(owner, "taken1".into(), "https://a.example".into()))
            .await
            .unwrap();

        let service = UrlService::new(
            repo.clone(),
            ScriptedGenerator::new(&["taken1", "fresh1"]),
            Arc::new(NullCache::new()),
            UrlServiceOptions::default(),
        );

        let created = service
            .create_short_url(owner, "https://b.example")
            .await
            .unwrap();

        assert_eq!(created.short_code, "fresh1");
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_create_skips_reserved_codes() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let service = UrlService::new(
            repo.clone(),
            ScriptedGenerator::new(&["health", "fresh1"]),
            Arc::new(NullCache::new()),
            UrlServiceOptions::default(),
        );

        let created = service
            .create_short_url(Uuid::new_v4(), "https://b.example")
            .await
            .unwrap();

        assert_eq!(created.short_code, "fresh1");
        assert!(!repo.exists_by_code("health").await.unwrap());
    }

    #[tokio::test]
    async fn test_reserved_code_consumes_an_attempt() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let service = UrlService::new(
            repo.clone(),
            ScriptedGenerator::new(&["health", "fresh1"]),
            Arc::new(NullCache::new()),
            UrlServiceOptions {
                max_retries: 1,
                ..UrlServiceOptions::default()
            },
        );

        let err = service
            .create_short_url(Uuid::new_v4(), "https://b.example")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn test_create_exhausted_retries_persists_nothing() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let other = Uuid::new_v4();
        for code in ["dup001", "dup002", "dup003"] {
            repo.save(NewShortUrl::new(other, code.into(), "https://a.example".into()))
                .await
                .unwrap();
        }

        let service = UrlService::new(
            repo.clone(),
            ScriptedGenerator::new(&["dup001", "dup002", "dup003", "never1"]),
            Arc::new(NullCache::new()),
            UrlServiceOptions {
                max_retries: 3,
                ..Default::default()
            },
        );

        let owner = Uuid::new_v4();
        let err = service
            .create_short_url(owner, "https://example.com/x")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
        assert_eq!(repo.len(), 3);
        assert!(repo.find_by_owner(owner, 100, 0).await.unwrap().is_empty());
        assert!(!repo.exists_by_code("never1").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_retries_on_unique_violation_from_save() {
        let mut generator = MockCodeGenerator::new();
        let mut calls = 0;
        generator.expect_generate().times(2).returning(move || {
            calls += 1;
            Ok(format!("code0{calls}"))
        });

        let mut repo = MockUrlRepository::new();
        repo.expect_exists_by_code().times(2).returning(|_| Ok(false));
        repo.expect_save()
            .withf(|new_url| new_url.short_code == "code01")
            .times(1)
            .returning(|_| {
                Err(StoreError::UniqueViolation {
                    constraint: "short_urls_short_code_key".to_string(),
                })
            });
        repo.expect_save()
            .withf(|new_url| new_url.short_code == "code02")
            .times(1)
            .returning(|new_url| {
                Ok(ShortUrl {
                    id: new_url.id,
                    owner_id: new_url.owner_id,
                    short_code: new_url.short_code,
                    long_url: new_url.long_url,
                    redirects: 0,
                    created_at: Utc::now(),
                    updated_at: None,
                })
            });

        let service = UrlService::new(
            Arc::new(repo),
            generator,
            Arc::new(NullCache::new()),
            UrlServiceOptions::default(),
        );

        let created = service
            .create_short_url(Uuid::new_v4(), "https://example.com")
            .await
            .unwrap();

        assert_eq!(created.short_code, "code02");
    }

    #[tokio::test]
    async fn test_create_other_store_failure_is_not_retried() {
        let mut generator = MockCodeGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|| Ok("abc123".to_string()));

        let mut repo = MockUrlRepository::new();
        repo.expect_exists_by_code().times(1).returning(|_| Ok(false));
        repo.expect_save()
            .times(1)
            .returning(|_| Err(StoreError::Internal("connection reset".to_string())));

        let service = UrlService::new(
            Arc::new(repo),
            generator,
            Arc::new(NullCache::new()),
            UrlServiceOptions::default(),
        );

        let err = service
            .create_short_url(Uuid::new_v4(), "https://example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_generator_failure_is_internal() {
        let service = UrlService::new(
            Arc::new(InMemoryUrlRepository::new()),
            ScriptedGenerator::new(&[]),
            Arc::new(NullCache::new()),
            UrlServiceOptions::default(),
        );

        let err = service
            .create_short_url(Uuid::new_v4(), "https://example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_non_positive_max_retries_means_one_attempt() {
        for max_retries in [0, -3] {
            let mut generator = MockCodeGenerator::new();
            generator
                .expect_generate()
                .times(1)
                .returning(|| Ok("taken1".to_string()));
            let mut repo = MockUrlRepository::new();
            repo.expect_exists_by_code().times(1).returning(|_| Ok(true));

            let service = UrlService::new(
                Arc::new(repo),
                generator,
                Arc::new(NullCache::new()),
                UrlServiceOptions {
                    max_retries,
                    ..Default::default()
                },
            );

            assert_eq!(service.max_retries(), 1);
            let err = service
                .create_short_url(Uuid::new_v4(), "https://example.com")
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Internal { .. }));
        }
    }

    /// Store whose existence check never completes.
    #[derive(Default)]
    struct StalledRepository {
        exists_calls: AtomicUsize,
    }

    #[async_trait]
    impl UrlRepository for StalledRepository {
        async fn save(&self, _new_url: NewShortUrl) -> StoreResult<ShortUrl> {
            panic!("save must not be reached")
        }
        async fn exists_by_code(&self, _short_code: &str) -> StoreResult<bool> {
            self.exists_calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
        async fn find_by_code(&self, _short_code: &str) -> StoreResult<Option<ShortUrl>> {
            unimplemented!()
        }
        async fn find_by_id(&self, _id: Uuid) -> StoreResult<Option<ShortUrl>> {
            unimplemented!()
        }
        async fn find_by_owner(
            &self,
            _owner_id: Uuid,
            _limit: i64,
            _offset: i64,
        ) -> StoreResult<Vec<ShortUrl>> {
            unimplemented!()
        }
        async fn update(&self, _url: &ShortUrl) -> StoreResult<ShortUrl> {
            unimplemented!()
        }
        async fn delete(&self, _id: Uuid, _owner_id: Uuid) -> StoreResult<()> {
            unimplemented!()
        }
        async fn increment_redirects(&self, _short_code: &str) -> StoreResult<()> {
            unimplemented!()
        }
        async fn ping(&self) -> StoreResult<()> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_timeout_abandons_retry_loop() {
        let repo = Arc::new(StalledRepository::default());
        let service = UrlService::new(
            repo.clone(),
            RandomCodeGenerator::default(),
            Arc::new(NullCache::new()),
            UrlServiceOptions {
                max_retries: 10,
                ..Default::default()
            },
        );

        let result = tokio::time::timeout(
            Duration::from_millis(50),
            service.create_short_url(Uuid::new_v4(), "https://example.com"),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(repo.exists_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found_before_and_after_cache_use() {
        let (service, _, cache) = memory_service();

        let first = service.get_original_url("nope123").await.unwrap_err();
        assert!(matches!(first, AppError::NotFound { .. }));

        cache
            .set_url("other12", "https://example.com", None)
            .await
            .unwrap();

        let second = service.get_original_url("nope123").await.unwrap_err();
        assert!(matches!(second, AppError::NotFound { .. }));
        assert_eq!(cache.get_url("nope123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_code_skips_cache_and_store() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().never();
        let mut cache = MockCacheService::new();
        cache.expect_get_url().never();

        let service = UrlService::new(
            Arc::new(repo),
            RandomCodeGenerator::default(),
            Arc::new(cache),
            UrlServiceOptions::default(),
        );

        for code in ["favicon.ico", "ab", "has-dash"] {
            let err = service.get_original_url(code).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound { .. }), "{code}");
        }
    }

    #[tokio::test]
    async fn test_cache_miss_populates_cache_and_counts() {
        let (service, repo, cache) = memory_service();
        let created = service
            .create_short_url(Uuid::new_v4(), "https://example.com/miss")
            .await
            .unwrap();

        assert_eq!(cache.get_url(&created.short_code).await.unwrap(), None);

        service.get_original_url(&created.short_code).await.unwrap();

        assert_eq!(
            cache.get_url(&created.short_code).await.unwrap().as_deref(),
            Some("https://example.com/miss")
        );
        let stored = repo.find_by_code(&created.short_code).await.unwrap().unwrap();
        assert_eq!(stored.redirects, 1);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store_lookup_but_counts() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().never();
        repo.expect_increment_redirects()
            .withf(|code| code == "hot123")
            .times(1)
            .returning(|_| Ok(()));

        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .times(1)
            .returning(|_| Ok(Some("https://cached.example".to_string())));

        let service = UrlService::new(
            Arc::new(repo),
            RandomCodeGenerator::default(),
            Arc::new(cache),
            UrlServiceOptions::default(),
        );

        assert_eq!(
            service.get_original_url("hot123").await.unwrap(),
            "https://cached.example"
        );
    }

    #[tokio::test]
    async fn test_empty_cached_value_is_treated_as_miss() {
        let owner = Uuid::new_v4();
        let url = test_url(owner, "empty1", "https://store.example");

        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(url.clone())));
        repo.expect_increment_redirects().times(1).returning(|_| Ok(()));

        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .returning(|_| Ok(Some(String::new())));
        cache.expect_set_url().times(1).returning(|_, _, _| Ok(()));

        let service = UrlService::new(
            Arc::new(repo),
            RandomCodeGenerator::default(),
            Arc::new(cache),
            UrlServiceOptions::default(),
        );

        assert_eq!(
            service.get_original_url("empty1").await.unwrap(),
            "https://store.example"
        );
    }

    #[tokio::test]
    async fn test_cache_failures_degrade_to_store() {
        let owner = Uuid::new_v4();
        let url = test_url(owner, "abc123", "https://store.example");

        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(move |_| Ok(Some(url.clone())));
        repo.expect_increment_redirects().times(1).returning(|_| Ok(()));

        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .returning(|_| Err(CacheError::ConnectionError("refused".to_string())));
        cache
            .expect_set_url()
            .returning(|_, _, _| Err(CacheError::ConnectionError("refused".to_string())));

        let service = UrlService::new(
            Arc::new(repo),
            RandomCodeGenerator::default(),
            Arc::new(cache),
            UrlServiceOptions::default(),
        );

        assert_eq!(
            service.get_original_url("abc123").await.unwrap(),
            "https://store.example"
        );
    }

    #[tokio::test]
    async fn test_cache_populated_with_configured_ttl() {
        let owner = Uuid::new_v4();
        let url = test_url(owner, "ttl123", "https://store.example");

        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code()
            .returning(move |_| Ok(Some(url.clone())));
        repo.expect_increment_redirects().returning(|_| Ok(()));

        let mut cache = MockCacheService::new();
        cache.expect_get_url().returning(|_| Ok(None));
        cache
            .expect_set_url()
            .withf(|code, long_url, ttl| {
                code == "ttl123"
                    && long_url == "https://store.example"
                    && *ttl == Some(Duration::from_secs(42))
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = UrlService::new(
            Arc::new(repo),
            RandomCodeGenerator::default(),
            Arc::new(cache),
            UrlServiceOptions {
                cache_ttl: Duration::from_secs(42),
                ..Default::default()
            },
        );

        service.get_original_url("ttl123").await.unwrap();
    }

    #[tokio::test]
    async fn test_increment_failure_does_not_fail_read() {
        let owner = Uuid::new_v4();
        let url = test_url(owner, "abc123", "https://store.example");

        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code()
            .returning(move |_| Ok(Some(url.clone())));
        repo.expect_increment_redirects()
            .times(1)
            .returning(|_| Err(StoreError::Internal("deadlock".to_string())));

        let service = UrlService::new(
            Arc::new(repo),
            RandomCodeGenerator::default(),
            Arc::new(NullCache::new()),
            UrlServiceOptions::default(),
        );

        assert!(service.get_original_url("abc123").await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_count_exactly() {
        let (service, repo, _) = memory_service();
        let service = Arc::new(service);
        let created = service
            .create_short_url(Uuid::new_v4(), "https://example.com/hot")
            .await
            .unwrap();

        const N: usize = 64;
        let handles: Vec<_> = (0..N)
            .map(|_| {
                let service = service.clone();
                let code = created.short_code.clone();
                tokio::spawn(async move { service.get_original_url(&code).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "https://example.com/hot");
        }

        let stored = repo.find_by_code(&created.short_code).await.unwrap().unwrap();
        assert_eq!(stored.redirects, N as i64);
    }

    #[tokio::test]
    async fn test_update_invalidates_cached_value() {
        let (service, _, cache) = memory_service();
        let owner = Uuid::new_v4();
        let created = service
            .create_short_url(owner, "https://old.example")
            .await
            .unwrap();

        service.get_original_url(&created.short_code).await.unwrap();
        assert!(cache.get_url(&created.short_code).await.unwrap().is_some());

        let updated = service
            .update_url(created.id, owner, "https://new.example")
            .await
            .unwrap();
        assert_eq!(updated.long_url, "https://new.example");
        assert!(updated.updated_at.is_some());

        assert_eq!(
            service.get_original_url(&created.short_code).await.unwrap(),
            "https://new.example"
        );
    }

    #[tokio::test]
    async fn test_delete_invalidates_cached_value() {
        let (service, repo, cache) = memory_service();
        let owner = Uuid::new_v4();
        let created = service
            .create_short_url(owner, "https://gone.example")
            .await
            .unwrap();
        service.get_original_url(&created.short_code).await.unwrap();

        service.delete_url(created.id, owner).await.unwrap();

        assert_eq!(cache.get_url(&created.short_code).await.unwrap(), None);
        assert!(repo.is_empty());
        let err = service
            .get_original_url(&created.short_code)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_url() {
        let (service, repo, _) = memory_service();
        let owner = Uuid::new_v4();
        let created = service
            .create_short_url(owner, "https://keep.example")
            .await
            .unwrap();

        let err = service
            .update_url(created.id, owner, "mailto:x@example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.long_url, "https://keep.example");
    }

    #[tokio::test]
    async fn test_mutations_by_non_owner_are_unauthorized_and_mutate_nothing() {
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let url = test_url(owner, "own123", "https://example.com");
        let id = url.id;

        let mut repo = MockUrlRepository::new();
        let by_id = url.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(by_id.clone())));
        repo.expect_find_by_code()
            .returning(move |_| Ok(Some(url.clone())));
        repo.expect_update().never();
        repo.expect_delete().never();

        let mut cache = MockCacheService::new();
        cache.expect_invalidate().never();

        let service = UrlService::new(
            Arc::new(repo),
            RandomCodeGenerator::default(),
            Arc::new(cache),
            UrlServiceOptions::default(),
        );

        let update = service
            .update_url(id, intruder, "https://evil.example")
            .await
            .unwrap_err();
        assert!(matches!(update, AppError::Unauthorized { .. }));

        let delete = service.delete_url(id, intruder).await.unwrap_err();
        assert!(matches!(delete, AppError::Unauthorized { .. }));

        let analytics = service.get_analytics("own123", intruder).await.unwrap_err();
        assert!(matches!(analytics, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_mutations_on_missing_records_are_not_found() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_find_by_code().returning(|_| Ok(None));
        repo.expect_update().never();
        repo.expect_delete().never();

        let service = UrlService::new(
            Arc::new(repo),
            RandomCodeGenerator::default(),
            Arc::new(NullCache::new()),
            UrlServiceOptions::default(),
        );
        let owner = Uuid::new_v4();

        let update = service
            .update_url(Uuid::new_v4(), owner, "https://example.com")
            .await
            .unwrap_err();
        assert!(matches!(update, AppError::NotFound { .. }));

        let delete = service.delete_url(Uuid::new_v4(), owner).await.unwrap_err();
        assert!(matches!(delete, AppError::NotFound { .. }));

        let analytics = service.get_analytics("abc123", owner).await.unwrap_err();
        assert!(matches!(analytics, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_analytics_reads_store_count() {
        let (service, _, _) = memory_service();
        let owner = Uuid::new_v4();
        let created = service
            .create_short_url(owner, "https://example.com/stats")
            .await
            .unwrap();

        assert_eq!(service.get_analytics(&created.short_code, owner).await.unwrap(), 0);

        for _ in 0..3 {
            service.get_original_url(&created.short_code).await.unwrap();
        }

        assert_eq!(service.get_analytics(&created.short_code, owner).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_analytics_rejects_malformed_code() {
        let (service, _, _) = memory_service();

        for bad in ["ab", "favicon.ico", "my-code"] {
            let err = service.get_analytics(bad, Uuid::new_v4()).await.unwrap_err();
            match err {
                AppError::Validation { details, .. } => {
                    assert_eq!(details["field"], "short_code", "{bad}");
                }
                other => panic!("expected validation error for {bad}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_paginated_urls_only_returns_owner_records() {
        let (service, _, _) = memory_service();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        for i in 0..5 {
            service
                .create_short_url(owner, &format!("https://example.com/{i}"))
                .await
                .unwrap();
        }
        service
            .create_short_url(other, "https://example.com/other")
            .await
            .unwrap();

        let first = service.get_paginated_urls(owner, 2, 0).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].long_url, "https://example.com/4");
        assert_eq!(first[1].long_url, "https://example.com/3");

        let rest = service.get_paginated_urls(owner, 10, 2).await.unwrap();
        assert_eq!(rest.len(), 3);
        assert!(rest.iter().all(|u| u.owner_id == owner));
    }

    #[tokio::test]
    async fn test_paginated_urls_rejects_bad_bounds() {
        let (service, _, _) = memory_service();
        let owner = Uuid::new_v4();

        for (limit, offset) in [(0, 0), (101, 0), (-1, 0), (10, -1)] {
            let err = service
                .get_paginated_urls(owner, limit, offset)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{limit}/{offset}");
        }
    }
}
