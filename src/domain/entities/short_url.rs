//! Short URL aggregate: the mapping from a short code to a long URL.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A persisted short URL owned by a single user.
///
/// `id`, `owner_id`, `short_code` and `created_at` never change after creation.
/// Only the owner may change `long_url`; `redirects` only ever grows and is
/// bumped by the store itself, never by read-modify-write in the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortUrl {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub short_code: String,
    pub long_url: String,
    pub redirects: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ShortUrl {
    /// Returns true if `owner_id` created this short URL.
    pub fn is_owned_by(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id
    }

    /// Replaces the destination and stamps `updated_at`.
    ///
    /// The caller is responsible for validating `long_url` first.
    pub fn change_long_url(&mut self, long_url: String) {
        self.long_url = long_url;
        self.updated_at = Some(Utc::now());
    }
}

/// Input data for persisting a new short URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortUrl {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub short_code: String,
    pub long_url: String,
}

impl NewShortUrl {
    /// Builds a record with a freshly assigned random id.
    pub fn new(owner_id: Uuid, short_code: String, long_url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            short_code,
            long_url,
        }
    }
}
