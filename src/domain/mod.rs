//! Domain layer containing business entities and contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures ([`entities::UrlRewrite`] and friends)
//! - [`repositories`] - Data access trait definitions
//! - [`invalidation`] - Mapping from written records to cache invalidation requests
//!
//! # Write Flow
//!
//! 1. [`crate::application::services::UrlRewriteService`] persists a rewrite via
//!    [`repositories::UrlRewriteRepository`]
//! 2. After the write commits, the stored row is handed to
//!    [`crate::application::services::CacheInvalidator::on_after_write`]
//! 3. The invalidator builds an [`invalidation::InvalidationRequest`] and submits it
//!    to the injected [`crate::infrastructure::bus::InvalidationBus`]

pub mod entities;
pub mod invalidation;
pub mod repositories;
