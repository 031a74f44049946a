//! URL rewrite management service.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::application::services::CacheInvalidator;
use crate::domain::entities::{EntityType, NewUrlRewrite, UrlRewrite, UrlRewritePatch};
use crate::domain::repositories::UrlRewriteRepository;
use crate::error::AppError;
use crate::infrastructure::bus::InvalidationBus;
use crate::utils::request_path::{PathError, normalize_request_path, normalize_target_path};

/// Largest page size accepted by [`UrlRewriteService::list`].
pub const MAX_PAGE_SIZE: i64 = 100;

/// Service for creating, updating and deleting URL rewrites.
///
/// Every committed write is followed by exactly one call to
/// [`CacheInvalidator::on_after_write`] with the stored row.
pub struct UrlRewriteService<R: UrlRewriteRepository, B: InvalidationBus + ?Sized> {
    repository: Arc<R>,
    invalidator: CacheInvalidator<B>,
}

fn path_error(field: &'static str, value: &str, e: PathError) -> AppError {
    AppError::bad_request(
        format!("Invalid {}", field.replace('_', " ")),
        json!({ "field": field, "value": value, "reason": e.to_string() }),
    )
}

impl<R: UrlRewriteRepository, B: InvalidationBus + ?Sized> UrlRewriteService<R, B> {
    /// Creates a new rewrite service.
    pub fn new(repository: Arc<R>, invalidator: CacheInvalidator<B>) -> Self {
        Self {
            repository,
            invalidator,
        }
    }

    /// Creates a rewrite and invalidates the cache of the entity it points to.
    ///
    /// The request path is normalized; a missing target path defaults to the
    /// entity's canonical system path.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if a path is invalid, if a non-custom
    /// rewrite has no positive entity ID, or if a custom rewrite has no target path.
    /// Returns [`AppError::Conflict`] if the request path already exists for the store.
    pub async fn create(&self, new_rewrite: NewUrlRewrite) -> Result<UrlRewrite, AppError> {
        if new_rewrite.entity_type != EntityType::Custom && new_rewrite.entity_id <= 0 {
            return Err(AppError::bad_request(
                "Entity ID must be positive",
                json!({
                    "entity_type": new_rewrite.entity_type.as_str(),
                    "entity_id": new_rewrite.entity_id,
                }),
            ));
        }

        let request_path = normalize_request_path(&new_rewrite.request_path)
            .map_err(|e| path_error("request_path", &new_rewrite.request_path, e))?;

        let target_path = match new_rewrite.target_path.as_deref() {
            Some(target) => {
                normalize_target_path(target).map_err(|e| path_error("target_path", target, e))?
            }
            None => new_rewrite
                .entity_type
                .canonical_target_path(new_rewrite.entity_id)
                .ok_or_else(|| {
                    AppError::bad_request(
                        "Target path is required for custom rewrites",
                        json!({ "entity_type": new_rewrite.entity_type.as_str() }),
                    )
                })?,
        };

        if target_path == request_path {
            return Err(AppError::bad_request(
                "Target path must differ from request path",
                json!({ "request_path": request_path }),
            ));
        }

        self.ensure_request_path_free(&request_path, new_rewrite.store_id, None)
            .await?;

        let new_rewrite = NewUrlRewrite {
            request_path,
            target_path: Some(target_path),
            ..new_rewrite
        };

        let saved = self.repository.create(new_rewrite).await?;
        info!(
            "Created rewrite {} ({} -> {})",
            saved.id, saved.request_path, saved.target_path
        );

        self.after_write(&saved).await?;
        Ok(saved)
    }

    /// Partially updates a rewrite and invalidates the cache of its entity.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty patch, invalid paths, or a
    /// patch that would make the rewrite redirect to itself.
    /// Returns [`AppError::NotFound`] if no rewrite has this ID.
    /// Returns [`AppError::Conflict`] if the new request path is taken.
    pub async fn update(&self, id: i64, patch: UrlRewritePatch) -> Result<UrlRewrite, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request(
                "Nothing to update",
                json!({ "id": id }),
            ));
        }

        let current = self.get(id).await?;

        let request_path = patch
            .request_path
            .as_deref()
            .map(|p| normalize_request_path(p).map_err(|e| path_error("request_path", p, e)))
            .transpose()?;
        let target_path = patch
            .target_path
            .as_deref()
            .map(|p| normalize_target_path(p).map_err(|e| path_error("target_path", p, e)))
            .transpose()?;

        let effective_request = request_path.as_deref().unwrap_or(current.request_path.as_str());
        let effective_target = target_path.as_deref().unwrap_or(current.target_path.as_str());
        if effective_request == effective_target {
            return Err(AppError::bad_request(
                "Target path must differ from request path",
                json!({ "id": id, "request_path": effective_request }),
            ));
        }

        if let Some(ref path) = request_path
            && path != &current.request_path
        {
            self.ensure_request_path_free(path, current.store_id, Some(id))
                .await?;
        }

        let patch = UrlRewritePatch {
            request_path,
            target_path,
            ..patch
        };

        let saved = self.repository.update(id, patch).await?;
        info!("Updated rewrite {}", saved.id);

        self.after_write(&saved).await?;
        Ok(saved)
    }

    /// Deletes a rewrite and invalidates the cache of the entity it pointed to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no rewrite has this ID.
    pub async fn delete(&self, id: i64) -> Result<UrlRewrite, AppError> {
        let removed = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found("URL rewrite not found", json!({ "id": id })))?;
        info!("Deleted rewrite {} ({})", removed.id, removed.request_path);

        self.after_write(&removed).await?;
        Ok(removed)
    }

    /// Retrieves a rewrite by ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no rewrite has this ID.
    pub async fn get(&self, id: i64) -> Result<UrlRewrite, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("URL rewrite not found", json!({ "id": id })))
    }

    /// Retrieves the rewrite registered for a request path in a store.
    ///
    /// The lookup path is normalized the same way stored paths are.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid path and
    /// [`AppError::NotFound`] if nothing matches.
    pub async fn find_by_request_path(
        &self,
        request_path: &str,
        store_id: i64,
    ) -> Result<UrlRewrite, AppError> {
        let path = normalize_request_path(request_path)
            .map_err(|e| path_error("request_path", request_path, e))?;

        self.repository
            .find_by_request_path(&path, store_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "URL rewrite not found",
                    json!({ "request_path": path, "store_id": store_id }),
                )
            })
    }

    /// Lists every rewrite pointing at an entity.
    pub async fn find_by_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        store_id: Option<i64>,
    ) -> Result<Vec<UrlRewrite>, AppError> {
        self.repository
            .find_by_entity(entity_type, entity_id, store_id)
            .await
    }

    /// Lists rewrites page by page, returning the page items and the total count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `page < 1`, if `page_size` is outside
    /// `1..=MAX_PAGE_SIZE`, or if the page lies beyond the addressable range.
    pub async fn list(
        &self,
        page: i64,
        page_size: i64,
        store_id: Option<i64>,
    ) -> Result<(Vec<UrlRewrite>, i64), AppError> {
        if page < 1 {
            return Err(AppError::bad_request(
                "Page must be at least 1",
                json!({ "page": page }),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::bad_request(
                "Invalid page size",
                json!({ "page_size": page_size, "max": MAX_PAGE_SIZE }),
            ));
        }

        if (page - 1).checked_mul(page_size).is_none() {
            return Err(AppError::bad_request(
                "Page is out of range",
                json!({ "page": page, "page_size": page_size }),
            ));
        }

        let items = self.repository.list(page, page_size, store_id).await?;
        let total = self.repository.count(store_id).await?;

        Ok((items, total))
    }

    async fn ensure_request_path_free(
        &self,
        request_path: &str,
        store_id: i64,
        except_id: Option<i64>,
    ) -> Result<(), AppError> {
        match self
            .repository
            .find_by_request_path(request_path, store_id)
            .await?
        {
            Some(existing) if Some(existing.id) != except_id => Err(AppError::conflict(
                "Request path already exists for this store",
                json!({
                    "request_path": request_path,
                    "store_id": store_id,
                    "existing_id": existing.id,
                }),
            )),
            _ => Ok(()),
        }
    }

    async fn after_write(&self, record: &UrlRewrite) -> Result<(), AppError> {
        self.invalidator.on_after_write(record).await.map_err(|e| {
            warn!("Invalidation failed for rewrite {}: {}", record.id, e);
            AppError::from(e)
        })
    }
}
