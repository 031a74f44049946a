//! Application layer services implementing business logic.
//!
//! Services consume the repository and bus traits and are constructed with
//! their collaborators passed in explicitly.
//!
//! # Available Services
//!
//! - [`services::cache_invalidator::CacheInvalidator`] - Write-triggered cache invalidation
//! - [`services::url_rewrite_service::UrlRewriteService`] - Rewrite management; calls the
//!   invalidator after every committed write

pub mod services;
