//! URL rewrite entity mapping a request path to a target path.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::entities::EntityType;
use crate::domain::invalidation::InvalidationError;

/// HTTP redirect semantics of a rewrite.
///
/// `None` serves the target transparently without a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectType {
    #[default]
    None,
    Permanent,
    Temporary,
}

impl RedirectType {
    /// Stored code: `0`, `301` or `302`.
    pub fn code(&self) -> i16 {
        match self {
            RedirectType::None => 0,
            RedirectType::Permanent => 301,
            RedirectType::Temporary => 302,
        }
    }

    pub fn is_redirect(&self) -> bool {
        !matches!(self, RedirectType::None)
    }
}

impl TryFrom<i16> for RedirectType {
    type Error = i16;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RedirectType::None),
            301 => Ok(RedirectType::Permanent),
            302 => Ok(RedirectType::Temporary),
            other => Err(other),
        }
    }
}

/// A stored URL rewrite.
///
/// `entity_type` holds the stored code as read from the database. Rows can be
/// written by other systems, so the code is only parsed on demand via [`UrlRewrite::kind`].
#[derive(Debug, Clone)]
pub struct UrlRewrite {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub request_path: String,
    pub target_path: String,
    pub redirect_type: RedirectType,
    pub store_id: i64,
    pub description: Option<String>,
    pub is_autogenerated: bool,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UrlRewrite {
    /// Parses the stored entity type code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidationError::UnknownEntityType`] for codes outside [`EntityType`].
    pub fn kind(&self) -> Result<EntityType, InvalidationError> {
        self.entity_type.parse()
    }

    /// Decodes the stored metadata object.
    ///
    /// Missing or empty metadata yields an empty map.
    pub fn metadata(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match self.metadata.as_deref() {
            None | Some("") => Ok(Map::new()),
            Some(raw) => serde_json::from_str(raw),
        }
    }

    /// Replaces the metadata with the serialized form of `metadata`.
    pub fn set_metadata(&mut self, metadata: &Map<String, Value>) -> Result<(), serde_json::Error> {
        self.metadata = Some(serde_json::to_string(metadata)?);
        Ok(())
    }

    /// Replaces the metadata with an already serialized value, stored as-is.
    pub fn set_raw_metadata(&mut self, raw: impl Into<String>) {
        self.metadata = Some(raw.into());
    }
}

/// Input data for creating a new rewrite.
///
/// `target_path: None` defaults to [`EntityType::canonical_target_path`].
#[derive(Debug, Clone)]
pub struct NewUrlRewrite {
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub request_path: String,
    pub target_path: Option<String>,
    pub redirect_type: RedirectType,
    pub store_id: i64,
    pub description: Option<String>,
    pub is_autogenerated: bool,
    pub metadata: Option<Map<String, Value>>,
}

impl NewUrlRewrite {
    /// Creates a rewrite for `entity_type`/`entity_id` with defaults for the rest.
    pub fn new(entity_type: EntityType, entity_id: i64, request_path: impl Into<String>) -> Self {
        Self {
            entity_type,
            entity_id,
            request_path: request_path.into(),
            target_path: None,
            redirect_type: RedirectType::None,
            store_id: 0,
            description: None,
            is_autogenerated: false,
            metadata: None,
        }
    }
}

/// Partial update for an existing rewrite.
///
/// `None` fields are left unchanged. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UrlRewritePatch {
    pub request_path: Option<String>,
    pub target_path: Option<String>,
    pub redirect_type: Option<RedirectType>,
    pub description: Option<Option<String>>,
    pub metadata: Option<Map<String, Value>>,
}

impl UrlRewritePatch {
    pub fn is_empty(&self) -> bool {
        self.request_path.is_none()
            && self.target_path.is_none()
            && self.redirect_type.is_none()
            && self.description.is_none()
            && self.metadata.is_none()
    }
}
