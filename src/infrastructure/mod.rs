//! Storage and cache backends behind the domain traits.
//!
//! - [`cache`] - Redis, in-process, and no-op [`cache::CacheService`] backends
//! - [`persistence`] - PostgreSQL and in-memory repositories

pub mod cache;
pub mod persistence;
