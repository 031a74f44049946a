//! # URL Rewrite
//!
//! Storage for URL rewrites (request path to target path mappings with
//! redirect semantics) with cache invalidation triggered by every write.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entities, invalidation request model, repository traits
//! - **Application Layer** ([`application`]) - [`CacheInvalidator`] and [`UrlRewriteService`]
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL persistence and the
//!   invalidation bus (Redis pub/sub or no-op)
//!
//! ## Write Flow
//!
//! ```text
//! UrlRewriteService::create/update/delete
//!     └─ UrlRewriteRepository (commit)
//!         └─ CacheInvalidator::on_after_write(record)
//!             ├─ custom rewrite   → nothing
//!             ├─ unknown type     → InvalidationError::UnknownEntityType
//!             └─ product/category/cms-page
//!                   → InvalidationBus::submit({tag, entity_ids: [entity_id]})
//! ```
//!
//! ## Configuration
//!
//! Loaded from environment variables via [`config::Config`].

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub use application::services::{CacheInvalidator, UrlRewriteService};
pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{CacheInvalidator, UrlRewriteService};
    pub use crate::domain::entities::{
        EntityType, NewUrlRewrite, RedirectType, UrlRewrite, UrlRewritePatch,
    };
    pub use crate::domain::invalidation::{CacheTag, InvalidationError, InvalidationRequest};
    pub use crate::error::AppError;
    pub use crate::infrastructure::bus::{InvalidationBus, NullInvalidationBus};
}
