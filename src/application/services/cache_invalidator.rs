//! Write-triggered cache invalidation.

use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::{EntityType, UrlRewrite};
use crate::domain::invalidation::{InvalidationError, InvalidationRequest};
use crate::infrastructure::bus::InvalidationBus;

/// Notifies the invalidation bus after a URL rewrite is written.
///
/// Stateless: the only state is the injected bus, so one instance can be shared
/// across concurrent writers. Every call submits at most one request and never
/// deduplicates or retries; both belong to the bus.
pub struct CacheInvalidator<B: ?Sized> {
    bus: Arc<B>,
}

impl<B: ?Sized> Clone for CacheInvalidator<B> {
    fn clone(&self) -> Self {
        Self {
            bus: Arc::clone(&self.bus),
        }
    }
}

impl<B: InvalidationBus + ?Sized> CacheInvalidator<B> {
    /// Creates an invalidator submitting to `bus`.
    pub fn new(bus: Arc<B>) -> Self {
        Self { bus }
    }

    /// Hook called once per committed write of `record`.
    ///
    /// Custom rewrites have no backing entity and are skipped. Any other
    /// recognized type results in exactly one submission carrying the type's
    /// cache tag and `record.entity_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidationError::UnknownEntityType`] without submitting anything
    /// when the stored entity type is not recognized.
    pub async fn on_after_write(&self, record: &UrlRewrite) -> Result<(), InvalidationError> {
        match InvalidationRequest::for_record(record)? {
            Some(request) => self.submit(request).await,
            None => debug!(
                "Skipping invalidation for {} rewrite {}",
                record.entity_type, record.id
            ),
        }
        Ok(())
    }

    /// Submits the invalidation for one entity. Returns `false` for [`EntityType::Custom`].
    pub async fn invalidate_entity(&self, entity_type: EntityType, entity_id: i64) -> bool {
        let Some(request) = InvalidationRequest::for_entity(entity_type, entity_id) else {
            debug!(
                "Skipping invalidation for {} rewrite (entity {})",
                entity_type, entity_id
            );
            return false;
        };

        self.submit(request).await;
        true
    }

    async fn submit(&self, request: InvalidationRequest) {
        debug!("Invalidating {} for entities {:?}", request.tag, request.entity_ids);
        metrics::counter!(
            "url_rewrite_cache_invalidations_total",
            "tag" => request.tag.as_str()
        )
        .increment(1);

        self.bus.submit(request).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RedirectType;
    use crate::domain::invalidation::CacheTag;
    use crate::infrastructure::bus::MockInvalidationBus;
    use chrono::Utc;

    fn create_test_record(entity_type: &str, entity_id: i64) -> UrlRewrite {
        UrlRewrite {
            id: 1,
            entity_type: entity_type.to_string(),
            entity_id,
            request_path: "path.html".to_string(),
            target_path: "target.html".to_string(),
            redirect_type: RedirectType::None,
            store_id: 1,
            description: None,
            is_autogenerated: false,
            metadata: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_product_submits_one_request() {
        let mut mock_bus = MockInvalidationBus::new();
        mock_bus
            .expect_submit()
            .withf(|request| {
                request.tag.as_str() == "product-cache-tag" && request.entity_ids == vec![42]
            })
            .times(1)
            .return_const(());

        let invalidator = CacheInvalidator::new(Arc::new(mock_bus));

        let result = invalidator
            .on_after_write(&create_test_record("product", 42))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_custom_submits_nothing() {
        let mut mock_bus = MockInvalidationBus::new();
        mock_bus.expect_submit().times(0);

        let invalidator = CacheInvalidator::new(Arc::new(mock_bus));

        let result = invalidator
            .on_after_write(&create_test_record("custom", 7))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_cms_page_submits_one_request() {
        let mut mock_bus = MockInvalidationBus::new();
        mock_bus
            .expect_submit()
            .withf(|request| {
                request.tag.as_str() == "cms-page-cache-tag" && request.entity_ids == vec![99]
            })
            .times(1)
            .return_const(());

        let invalidator = CacheInvalidator::new(Arc::new(mock_bus));

        assert!(
            invalidator
                .on_after_write(&create_test_record("cms-page", 99))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_category_submits_one_request() {
        let mut mock_bus = MockInvalidationBus::new();
        mock_bus
            .expect_submit()
            .withf(|request| request.tag == CacheTag::CATEGORY && request.entity_ids == vec![3])
            .times(1)
            .return_const(());

        let invalidator = CacheInvalidator::new(Arc::new(mock_bus));

        assert!(
            invalidator
                .on_after_write(&create_test_record("category", 3))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_unknown_type_fails_without_submitting() {
        let mut mock_bus = MockInvalidationBus::new();
        mock_bus.expect_submit().times(0);

        let invalidator = CacheInvalidator::new(Arc::new(mock_bus));

        let result = invalidator
            .on_after_write(&create_test_record("gift-card", 5))
            .await;

        assert_eq!(
            result,
            Err(InvalidationError::UnknownEntityType("gift-card".to_string()))
        );
    }

    #[tokio::test]
    async fn test_repeated_writes_are_not_deduplicated() {
        let mut mock_bus = MockInvalidationBus::new();
        mock_bus
            .expect_submit()
            .withf(|request| request.tag == CacheTag::PRODUCT && request.entity_ids == vec![42])
            .times(2)
            .return_const(());

        let invalidator = CacheInvalidator::new(Arc::new(mock_bus));
        let record = create_test_record("product", 42);

        invalidator.on_after_write(&record).await.unwrap();
        invalidator.on_after_write(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalidate_entity_reports_custom_skip() {
        let mut mock_bus = MockInvalidationBus::new();
        mock_bus.expect_submit().times(1).return_const(());

        let invalidator = CacheInvalidator::new(Arc::new(mock_bus));

        assert!(!invalidator.invalidate_entity(EntityType::Custom, 1).await);
        assert!(invalidator.invalidate_entity(EntityType::Product, 1).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_each_submit() {
        let mut mock_bus = MockInvalidationBus::new();
        mock_bus.expect_submit().times(16).return_const(());

        let invalidator = CacheInvalidator::new(Arc::new(mock_bus));

        let handles: Vec<_> = (1..=16)
            .map(|id| {
                let invalidator = invalidator.clone();
                tokio::spawn(async move {
                    invalidator
                        .on_after_write(&create_test_record("product", id))
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }
}
