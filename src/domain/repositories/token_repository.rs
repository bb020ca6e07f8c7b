//! Repository trait for API token authentication.

use crate::domain::repositories::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// API token entity with metadata.
///
/// Tokens are stored as HMAC-SHA256 hashes; the raw value is shown once at creation.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub owner_id: Uuid,
    pub name: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Repository interface for API token management.
///
/// Every token belongs to exactly one owner; a successful lookup identifies the
/// user on whose behalf a request acts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Resolves a token hash to its owner.
    ///
    /// Returns `Ok(None)` if the hash is unknown or the token has been revoked.
    async fn find_owner(&self, token_hash: &str) -> StoreResult<Option<Uuid>>;

    /// Updates the `last_used_at` timestamp for a token.
    async fn update_last_used(&self, token_hash: &str) -> StoreResult<()>;

    /// Creates a new API token for `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if a token with the same hash already exists.
    async fn create_token(
        &self,
        owner_id: Uuid,
        name: &str,
        token_hash: &str,
    ) -> StoreResult<ApiToken>;

    /// Lists all tokens, newest first.
    async fn list_tokens(&self) -> StoreResult<Vec<ApiToken>>;

    /// Finds a token by its database id.
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<ApiToken>>;

    /// Finds a token by its name.
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<ApiToken>>;

    /// Revokes a token, preventing further authentication.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the token does not exist or is already revoked.
    async fn revoke_token(&self, id: i64) -> StoreResult<()>;
}
