//! Business logic services for the application layer.

pub mod cache_invalidator;
pub mod url_rewrite_service;

pub use cache_invalidator::CacheInvalidator;
pub use url_rewrite_service::UrlRewriteService;
