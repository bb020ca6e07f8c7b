//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::{StoreError, StoreResult, UrlRepository};

/// PostgreSQL repository for short URLs.
///
/// Code uniqueness is enforced by the `short_urls_short_code_key` constraint;
/// a duplicate insert surfaces as [`StoreError::UniqueViolation`].
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ShortUrlRow {
    id: Uuid,
    owner_id: Uuid,
    short_code: String,
    long_url: String,
    redirects: i64,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ShortUrlRow> for ShortUrl {
    fn from(row: ShortUrlRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            short_code: row.short_code,
            long_url: row.long_url,
            redirects: row.redirects,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, owner_id, short_code, long_url, redirects, created_at, updated_at";

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn save(&self, new_url: NewShortUrl) -> StoreResult<ShortUrl> {
        let row = sqlx::query_as::<_, ShortUrlRow>(&format!(
            r#"
            INSERT INTO short_urls (id, owner_id, short_code, long_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new_url.id)
        .bind(new_url.owner_id)
        .bind(&new_url.short_code)
        .bind(&new_url.long_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn exists_by_code(&self, short_code: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM short_urls WHERE short_code = $1)")
                .bind(short_code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn find_by_code(&self, short_code: &str) -> StoreResult<Option<ShortUrl>> {
        let row = sqlx::query_as::<_, ShortUrlRow>(&format!(
            "SELECT {COLUMNS} FROM short_urls WHERE short_code = $1"
        ))
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ShortUrl>> {
        let row = sqlx::query_as::<_, ShortUrlRow>(&format!(
            "SELECT {COLUMNS} FROM short_urls WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ShortUrl>> {
        let rows = sqlx::query_as::<_, ShortUrlRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM short_urls
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, url: &ShortUrl) -> StoreResult<ShortUrl> {
        let row = sqlx::query_as::<_, ShortUrlRow>(&format!(
            r#"
            UPDATE short_urls
            SET long_url = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(url.id)
        .bind(&url.long_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into).ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM short_urls WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn increment_redirects(&self, short_code: &str) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET redirects = redirects + 1, updated_at = NOW()
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
