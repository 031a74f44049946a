//! PostgreSQL implementation of the URL rewrite repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{
    EntityType, NewUrlRewrite, RedirectType, UrlRewrite, UrlRewritePatch,
};
use crate::domain::repositories::UrlRewriteRepository;
use crate::error::AppError;

const COLUMNS: &str = "id, entity_type, entity_id, request_path, target_path, redirect_type, \
     store_id, description, is_autogenerated, metadata, created_at, updated_at";

/// Raw `url_rewrite` row.
#[derive(sqlx::FromRow)]
struct UrlRewriteRow {
    id: i64,
    entity_type: String,
    entity_id: i64,
    request_path: String,
    target_path: String,
    redirect_type: i16,
    store_id: i64,
    description: Option<String>,
    is_autogenerated: bool,
    metadata: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UrlRewriteRow> for UrlRewrite {
    type Error = AppError;

    fn try_from(row: UrlRewriteRow) -> Result<Self, Self::Error> {
        let redirect_type = RedirectType::try_from(row.redirect_type).map_err(|code| {
            AppError::internal(
                "Stored redirect type is invalid",
                json!({ "id": row.id, "redirect_type": code }),
            )
        })?;

        Ok(UrlRewrite {
            id: row.id,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            request_path: row.request_path,
            target_path: row.target_path,
            redirect_type,
            store_id: row.store_id,
            description: row.description,
            is_autogenerated: row.is_autogenerated,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn encode_metadata(metadata: Option<&Map<String, Value>>) -> Result<Option<String>, AppError> {
    metadata
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| AppError::bad_request("Invalid metadata", json!({ "reason": e.to_string() })))
}

fn into_rewrites(rows: Vec<UrlRewriteRow>) -> Result<Vec<UrlRewrite>, AppError> {
    rows.into_iter().map(UrlRewrite::try_from).collect()
}

/// Row offset of a 1-based page.
fn page_offset(page: i64, page_size: i64) -> Result<i64, AppError> {
    page.checked_sub(1)
        .and_then(|p| p.checked_mul(page_size))
        .filter(|offset| *offset >= 0)
        .ok_or_else(|| {
            AppError::bad_request(
                "Page is out of range",
                json!({ "page": page, "page_size": page_size }),
            )
        })
}

/// PostgreSQL repository for URL rewrite storage and retrieval.
///
/// Uses bound parameters for every value; column lists are shared via [`COLUMNS`].
pub struct PgUrlRewriteRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRewriteRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRewriteRepository for PgUrlRewriteRepository {
    async fn create(&self, new_rewrite: NewUrlRewrite) -> Result<UrlRewrite, AppError> {
        let target_path = new_rewrite.target_path.ok_or_else(|| {
            AppError::bad_request(
                "Target path is required",
                json!({ "request_path": new_rewrite.request_path }),
            )
        })?;
        let metadata = encode_metadata(new_rewrite.metadata.as_ref())?;

        let sql = format!(
            r#"
            INSERT INTO url_rewrite
                (entity_type, entity_id, request_path, target_path, redirect_type,
                 store_id, description, is_autogenerated, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UrlRewriteRow>(&sql)
            .bind(new_rewrite.entity_type.as_str())
            .bind(new_rewrite.entity_id)
            .bind(&new_rewrite.request_path)
            .bind(&target_path)
            .bind(new_rewrite.redirect_type.code())
            .bind(new_rewrite.store_id)
            .bind(&new_rewrite.description)
            .bind(new_rewrite.is_autogenerated)
            .bind(metadata)
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UrlRewrite>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM url_rewrite WHERE id = $1");

        let row = sqlx::query_as::<_, UrlRewriteRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(UrlRewrite::try_from).transpose()
    }

    async fn find_by_request_path(
        &self,
        request_path: &str,
        store_id: i64,
    ) -> Result<Option<UrlRewrite>, AppError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM url_rewrite WHERE request_path = $1 AND store_id = $2"
        );

        let row = sqlx::query_as::<_, UrlRewriteRow>(&sql)
            .bind(request_path)
            .bind(store_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(UrlRewrite::try_from).transpose()
    }

    async fn find_by_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        store_id: Option<i64>,
    ) -> Result<Vec<UrlRewrite>, AppError> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM url_rewrite
            WHERE entity_type = $1
              AND entity_id = $2
              AND ($3::bigint IS NULL OR store_id = $3)
            ORDER BY store_id, id
            "#
        );

        let rows = sqlx::query_as::<_, UrlRewriteRow>(&sql)
            .bind(entity_type.as_str())
            .bind(entity_id)
            .bind(store_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        into_rewrites(rows)
    }

    async fn list(
        &self,
        page: i64,
        page_size: i64,
        store_id: Option<i64>,
    ) -> Result<Vec<UrlRewrite>, AppError> {
        let offset = page_offset(page, page_size)?;
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM url_rewrite
            WHERE ($1::bigint IS NULL OR store_id = $1)
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query_as::<_, UrlRewriteRow>(&sql)
            .bind(store_id)
            .bind(page_size)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        into_rewrites(rows)
    }

    async fn count(&self, store_id: Option<i64>) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM url_rewrite WHERE ($1::bigint IS NULL OR store_id = $1)",
        )
        .bind(store_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, patch: UrlRewritePatch) -> Result<UrlRewrite, AppError> {
        let metadata = encode_metadata(patch.metadata.as_ref())?;
        let (set_description, description) = match patch.description {
            Some(description) => (true, description),
            None => (false, None),
        };

        let sql = format!(
            r#"
            UPDATE url_rewrite SET
                request_path  = COALESCE($2, request_path),
                target_path   = COALESCE($3, target_path),
                redirect_type = COALESCE($4, redirect_type),
                description   = CASE WHEN $5 THEN $6 ELSE description END,
                metadata      = COALESCE($7, metadata),
                updated_at    = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UrlRewriteRow>(&sql)
            .bind(id)
            .bind(patch.request_path)
            .bind(patch.target_path)
            .bind(patch.redirect_type.map(|r| r.code()))
            .bind(set_description)
            .bind(description)
            .bind(metadata)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| AppError::not_found("URL rewrite not found", json!({ "id": id })))?
            .try_into()
    }

    async fn delete(&self, id: i64) -> Result<Option<UrlRewrite>, AppError> {
        let sql = format!("DELETE FROM url_rewrite WHERE id = $1 RETURNING {COLUMNS}");

        let row = sqlx::query_as::<_, UrlRewriteRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(UrlRewrite::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_row(redirect_type: i16) -> UrlRewriteRow {
        UrlRewriteRow {
            id: 3,
            entity_type: "product".to_string(),
            entity_id: 42,
            request_path: "blue-shirt.html".to_string(),
            target_path: "catalog/product/view/id/42".to_string(),
            redirect_type,
            store_id: 1,
            description: Some("Seasonal".to_string()),
            is_autogenerated: false,
            metadata: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let rewrite = UrlRewrite::try_from(create_test_row(301)).unwrap();

        assert_eq!(rewrite.id, 3);
        assert_eq!(rewrite.redirect_type, RedirectType::Permanent);
        assert_eq!(rewrite.kind().unwrap(), EntityType::Product);
        assert_eq!(rewrite.description.as_deref(), Some("Seasonal"));
    }

    #[test]
    fn test_row_conversion_rejects_bad_redirect_type() {
        let result = UrlRewrite::try_from(create_test_row(418));
        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 20).unwrap(), 0);
        assert_eq!(page_offset(3, 10).unwrap(), 20);
    }

    #[test]
    fn test_page_offset_out_of_range() {
        assert!(matches!(
            page_offset(i64::MAX, 20),
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(page_offset(0, 20), Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_encode_metadata() {
        assert_eq!(encode_metadata(None).unwrap(), None);

        let mut map = Map::new();
        map.insert("category_id".to_string(), json!("3"));
        assert_eq!(
            encode_metadata(Some(&map)).unwrap().as_deref(),
            Some(r#"{"category_id":"3"}"#)
        );
    }
}
