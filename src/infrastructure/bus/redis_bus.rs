//! Redis pub/sub invalidation bus.

use super::service::{BusError, BusResult, InvalidationBus};
use crate::domain::invalidation::InvalidationRequest;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

/// Publishes invalidation requests as JSON on a Redis channel.
///
/// Every cache layer subscribed to the channel evicts the tagged entries.
/// Publishing is retried with jittered exponential backoff; a request that
/// still fails is logged and dropped.
pub struct RedisInvalidationBus {
    client: ConnectionManager,
    channel: String,
    retry_attempts: usize,
}

impl RedisInvalidationBus {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `channel` - Pub/sub channel requests are published on
    /// - `retry_attempts` - Total publish attempts per request (at least 1)
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(
        redis_url: &str,
        channel: impl Into<String>,
        retry_attempts: usize,
    ) -> BusResult<Self> {
        let channel = channel.into();
        info!("Connecting invalidation bus to Redis channel {}", channel);

        let client = Client::open(redis_url).map_err(|e| {
            BusError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            BusError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| BusError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Invalidation bus connected");

        Ok(Self {
            client: manager,
            channel,
            retry_attempts: retry_attempts.max(1),
        })
    }

    /// Publishes one payload, returning the number of receiving subscribers.
    async fn publish(&self, payload: &str) -> BusResult<i64> {
        let mut conn = self.client.clone();

        redis::cmd("PUBLISH")
            .arg(&self.channel)
            .arg(payload)
            .query_async::<i64>(&mut conn)
            .await
            .map_err(|e| BusError::PublishError(e.to_string()))
    }
}

/// Backoff between publish attempts: 20ms, 40ms, 80ms... capped at 1s.
fn retry_strategy(retry_attempts: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(retry_attempts.saturating_sub(1))
}

#[async_trait]
impl InvalidationBus for RedisInvalidationBus {
    async fn submit(&self, request: InvalidationRequest) {
        let payload = match request.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to encode invalidation request: {}", e);
                return;
            }
        };

        let result = Retry::spawn(retry_strategy(self.retry_attempts), || {
            self.publish(&payload)
        })
        .await;

        match result {
            Ok(receivers) => {
                debug!(
                    "Bus PUBLISH: {} -> {} subscriber(s)",
                    payload, receivers
                );
                if receivers == 0 {
                    debug!("No subscribers on channel {}", self.channel);
                }
            }
            Err(e) => {
                metrics::counter!(
                    "url_rewrite_bus_publish_failures_total",
                    "tag" => request.tag.as_str()
                )
                .increment(1);
                warn!(
                    "Dropping invalidation for {} after {} attempt(s): {}",
                    request.tag, self.retry_attempts, e
                );
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
