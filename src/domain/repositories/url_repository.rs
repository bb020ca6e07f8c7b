//! Repository trait for short URL data access.

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::StoreResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Authoritative store for short URLs.
///
/// The store, not the service, guarantees short code uniqueness. Implementations
/// must reject a duplicate `short_code` with
/// [`StoreError::UniqueViolation`](crate::domain::repositories::StoreError::UniqueViolation)
/// and must increment redirect counters with a relative update.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Persists a new short URL.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the short code (or id) is already taken,
    /// `Internal` on any other storage failure.
    async fn save(&self, new_url: NewShortUrl) -> StoreResult<ShortUrl>;

    /// Checks whether a short code is already taken.
    ///
    /// Advisory only: a `false` answer can be invalidated by a concurrent writer
    /// before the subsequent [`save`](Self::save).
    async fn exists_by_code(&self, short_code: &str) -> StoreResult<bool>;

    /// Finds a short URL by its code.
    async fn find_by_code(&self, short_code: &str) -> StoreResult<Option<ShortUrl>>;

    /// Finds a short URL by its id.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ShortUrl>>;

    /// Lists an owner's short URLs, newest first.
    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ShortUrl>>;

    /// Writes the record's `long_url` and stamps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has the given id.
    async fn update(&self, url: &ShortUrl) -> StoreResult<ShortUrl>;

    /// Deletes a short URL only if it belongs to `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record matches both id and owner.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<()>;

    /// Atomically adds one to the redirect counter of `short_code`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the code does not exist.
    async fn increment_redirects(&self, short_code: &str) -> StoreResult<()>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> StoreResult<()>;
}
