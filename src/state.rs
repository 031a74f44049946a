use std::sync::Arc;

use sqlx::PgPool;

use crate::application::services::{CacheInvalidator, UrlRewriteService};
use crate::infrastructure::bus::InvalidationBus;
use crate::infrastructure::persistence::PgUrlRewriteRepository;

/// Rewrite service wired to PostgreSQL and a runtime-selected bus.
pub type RewriteService = UrlRewriteService<PgUrlRewriteRepository, dyn InvalidationBus>;

/// Shared handles built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub invalidator: CacheInvalidator<dyn InvalidationBus>,
    pub rewrite_service: Arc<RewriteService>,
}

impl AppState {
    pub fn new(pool: Arc<PgPool>, bus: Arc<dyn InvalidationBus>) -> Self {
        let invalidator = CacheInvalidator::new(bus);
        let repository = Arc::new(PgUrlRewriteRepository::new(pool));
        let rewrite_service = Arc::new(UrlRewriteService::new(repository, invalidator.clone()));

        Self {
            invalidator,
            rewrite_service,
        }
    }
}
