//! Runtime setup shared by the binaries.
//!
//! Handles logging, the database pool, migrations and bus selection.

use crate::config::Config;
use crate::infrastructure::bus::{InvalidationBus, NullInvalidationBus, RedisInvalidationBus};
use crate::state::AppState;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`; `config.log_format`
/// selects between human-readable and JSON output.
pub fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.log_format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Tracing already initialized: {e}");
    }
}

/// Connects to PostgreSQL with the configured pool settings.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    Ok(pool)
}

/// Applies pending migrations from `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to migrate")?;
    Ok(())
}

/// Selects the invalidation bus.
///
/// Falls back to [`NullInvalidationBus`] when Redis is not configured or unreachable.
pub async fn connect_bus(config: &Config) -> Arc<dyn InvalidationBus> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Invalidation disabled (NullInvalidationBus)");
        return Arc::new(NullInvalidationBus::new());
    };

    match RedisInvalidationBus::connect(
        redis_url,
        config.invalidation_channel.clone(),
        config.bus_retry_attempts,
    )
    .await
    {
        Ok(bus) => {
            tracing::info!("Invalidation enabled (Redis)");
            Arc::new(bus)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullInvalidationBus.", e);
            Arc::new(NullInvalidationBus::new())
        }
    }
}

/// Builds the application state: pool, migrations, bus and services.
///
/// # Errors
///
/// Returns an error if the database connection or migrations fail.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let pool = connect_database(config).await?;
    run_migrations(&pool).await?;
    let bus = connect_bus(config).await;

    Ok(AppState::new(Arc::new(pool), bus))
}
