#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use url_rewrite::application::services::{CacheInvalidator, UrlRewriteService};
use url_rewrite::domain::entities::{RedirectType, UrlRewrite};
use url_rewrite::domain::invalidation::InvalidationRequest;
use url_rewrite::infrastructure::bus::InvalidationBus;
use url_rewrite::infrastructure::persistence::PgUrlRewriteRepository;

/// Bus that keeps every submitted request in memory.
#[derive(Default)]
pub struct RecordingBus {
    submitted: Mutex<Vec<InvalidationRequest>>,
}

impl RecordingBus {
    pub fn submitted(&self) -> Vec<InvalidationRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl InvalidationBus for RecordingBus {
    async fn submit(&self, request: InvalidationRequest) {
        self.submitted.lock().unwrap().push(request);
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub fn create_record(entity_type: &str, entity_id: i64) -> UrlRewrite {
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

pub fn create_test_service(
    pool: PgPool,
) -> (
    UrlRewriteService<PgUrlRewriteRepository, RecordingBus>,
    Arc<RecordingBus>,
) {
    let bus = Arc::new(RecordingBus::default());
    let repository = Arc::new(PgUrlRewriteRepository::new(Arc::new(pool)));
    let service = UrlRewriteService::new(repository, CacheInvalidator::new(bus.clone()));

    (service, bus)
}

pub async fn insert_raw_rewrite(
    pool: &PgPool,
    entity_type: &str,
    entity_id: i64,
    request_path: &str,
    store_id: i64,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO url_rewrite (entity_type, entity_id, request_path, target_path, store_id)
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(entity_type)
    .bind(entity_id)
    .bind(request_path)
    .bind(format!("target/{request_path}"))
    .bind(store_id)
    .fetch_one(pool)
    .await
    .unwrap()
}
