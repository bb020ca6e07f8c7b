//! Core domain entities.
//!
//! - [`ShortUrl`] - A persisted short code to long URL mapping
//! - [`NewShortUrl`] - Input for creating a new mapping
//!
//! Entities are plain data; ownership and validation rules are enforced by
//! [`crate::application::services::UrlService`].

pub mod short_url;

pub use short_url::{NewShortUrl, ShortUrl};
