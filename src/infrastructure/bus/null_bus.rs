//! No-op bus implementation for disabled invalidation.

use super::service::InvalidationBus;
use crate::domain::invalidation::InvalidationRequest;
use async_trait::async_trait;
use tracing::debug;

/// A bus that drops every request.
///
/// Used when Redis is not configured, or as a fallback when the Redis
/// connection fails at startup.
pub struct NullInvalidationBus;

impl NullInvalidationBus {
    pub fn new() -> Self {
        debug!("Using NullInvalidationBus (invalidation disabled)");
        Self
    }
}

impl Default for NullInvalidationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvalidationBus for NullInvalidationBus {
    async fn submit(&self, request: InvalidationRequest) {
        debug!(
            "Dropping invalidation: tag={} ids={:?}",
            request.tag, request.entity_ids
        );
    }

    async fn health_check(&self) -> bool {
        true
    }
}
