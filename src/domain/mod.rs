//! Domain layer containing business entities and store contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions and the store error taxonomy
//!
//! The domain layer has no dependency on infrastructure or presentation layers.
//! Business rules are orchestrated in [`crate::application::services`].

pub mod entities;
pub mod repositories;
