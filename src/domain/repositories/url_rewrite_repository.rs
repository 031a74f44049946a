//! Repository trait for URL rewrite data access.

use crate::domain::entities::{EntityType, NewUrlRewrite, UrlRewrite, UrlRewritePatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing URL rewrites.
///
/// Implementations only persist; cache invalidation after a write is driven by
/// [`crate::application::services::UrlRewriteService`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRewriteRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRewriteRepository: Send + Sync {
    /// Creates a new rewrite.
    ///
    /// `new_rewrite.target_path` must already be resolved by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the request path already exists for the store.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_rewrite: NewUrlRewrite) -> Result<UrlRewrite, AppError>;

    /// Finds a rewrite by its database ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<UrlRewrite>, AppError>;

    /// Finds the rewrite registered for a request path within a store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_request_path(
        &self,
        request_path: &str,
        store_id: i64,
    ) -> Result<Option<UrlRewrite>, AppError>;

    /// Lists every rewrite pointing at an entity, optionally within one store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        store_id: Option<i64>,
    ) -> Result<Vec<UrlRewrite>, AppError>;

    /// Lists rewrites with pagination support.
    ///
    /// # Arguments
    ///
    /// - `page` - Page number (1-indexed)
    /// - `page_size` - Number of items per page
    /// - `store_id` - Optional store filter
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(
        &self,
        page: i64,
        page_size: i64,
        store_id: Option<i64>,
    ) -> Result<Vec<UrlRewrite>, AppError>;

    /// Counts rewrites, optionally filtered by store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self, store_id: Option<i64>) -> Result<i64, AppError>;

    /// Partially updates a rewrite and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no rewrite has this ID.
    /// Returns [`AppError::Conflict`] if the new request path is taken in the store.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: i64, patch: UrlRewritePatch) -> Result<UrlRewrite, AppError>;

    /// Deletes a rewrite, returning the removed row or `None` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<Option<UrlRewrite>, AppError>;
}
