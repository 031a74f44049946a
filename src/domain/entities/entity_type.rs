//! Entity types a URL rewrite can point to.

use std::fmt;
use std::str::FromStr;

use crate::domain::invalidation::{CacheTag, InvalidationError};

/// Classification of the target behind a rewrite.
///
/// The set is closed: anything else found in storage is rejected when parsed
/// (see [`EntityType::from_str`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Product,
    Category,
    CmsPage,
    /// A hand-written rewrite with no backing catalog or content entity.
    Custom,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Product,
        EntityType::Category,
        EntityType::CmsPage,
        EntityType::Custom,
    ];

    /// Code stored in the `entity_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Product => "product",
            EntityType::Category => "category",
            EntityType::CmsPage => "cms-page",
            EntityType::Custom => "custom",
        }
    }

    /// Cache tag grouping every cached artifact of this entity class.
    ///
    /// `Custom` has nothing to invalidate and maps to `None`.
    pub fn cache_tag(&self) -> Option<CacheTag> {
        match self {
            EntityType::Product => Some(CacheTag::PRODUCT),
            EntityType::Category => Some(CacheTag::CATEGORY),
            EntityType::CmsPage => Some(CacheTag::CMS_PAGE),
            EntityType::Custom => None,
        }
    }

    /// System path a rewrite resolves to when no explicit target is given.
    pub fn canonical_target_path(&self, entity_id: i64) -> Option<String> {
        match self {
            EntityType::Product => Some(format!("catalog/product/view/id/{entity_id}")),
            EntityType::Category => Some(format!("catalog/category/view/id/{entity_id}")),
            EntityType::CmsPage => Some(format!("cms/page/view/page_id/{entity_id}")),
            EntityType::Custom => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = InvalidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(EntityType::Product),
            "category" => Ok(EntityType::Category),
            "cms-page" => Ok(EntityType::CmsPage),
            "custom" => Ok(EntityType::Custom),
            other => Err(InvalidationError::UnknownEntityType(other.to_string())),
        }
    }
}
