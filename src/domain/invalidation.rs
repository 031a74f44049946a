//! Cache invalidation request model.
//!
//! A write to a [`UrlRewrite`] maps to at most one [`InvalidationRequest`]: the
//! cache tag of the rewrite's entity class plus the entity id. Building the
//! request is pure; handing it to a bus is done by
//! [`crate::application::services::CacheInvalidator`].

use serde::Serialize;
use std::fmt;

use crate::domain::entities::{EntityType, UrlRewrite};

/// Errors raised while mapping a written record to an invalidation request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidationError {
    #[error("Unknown entity type: {0:?}")]
    UnknownEntityType(String),
}

/// Identifier grouping every cached artifact of one entity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CacheTag(&'static str);

impl CacheTag {
    pub const PRODUCT: CacheTag = CacheTag("product-cache-tag");
    pub const CATEGORY: CacheTag = CacheTag("category-cache-tag");
    pub const CMS_PAGE: CacheTag = CacheTag("cms-page-cache-tag");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Request to evict every cached artifact tagged `tag` for the given entities.
///
/// Serialized on the wire as `{"tag":"product-cache-tag","entity_ids":[42]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationRequest {
    pub tag: CacheTag,
    pub entity_ids: Vec<i64>,
}

impl InvalidationRequest {
    /// Builds the request for one entity, or `None` for [`EntityType::Custom`].
    pub fn for_entity(entity_type: EntityType, entity_id: i64) -> Option<Self> {
        entity_type.cache_tag().map(|tag| Self {
            tag,
            entity_ids: vec![entity_id],
        })
    }

    /// Builds the request for a written rewrite.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidationError::UnknownEntityType`] if the stored entity
    /// type is not recognized.
    pub fn for_record(record: &UrlRewrite) -> Result<Option<Self>, InvalidationError> {
        let entity_type = record.kind()?;
        Ok(Self::for_entity(entity_type, record.entity_id))
    }

    /// JSON payload published on the bus.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
