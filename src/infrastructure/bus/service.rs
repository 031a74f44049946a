//! Invalidation bus trait and error types.

use async_trait::async_trait;
use std::fmt;

use crate::domain::invalidation::InvalidationRequest;

/// Errors that can occur while setting up a bus.
#[derive(Debug)]
pub enum BusError {
    ConnectionError(String),
    PublishError(String),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Bus connection error: {}", e),
            Self::PublishError(e) => write!(f, "Bus publish error: {}", e),
        }
    }
}

impl std::error::Error for BusError {}

/// Result type for bus setup operations.
pub type BusResult<T> = Result<T, BusError>;

/// Propagates cache eviction requests to every cache layer.
///
/// Submission is fire-and-forget from the caller's perspective: delivery,
/// retries and ordering are owned by the implementation, and failures are
/// logged rather than returned.
///
/// # Implementations
///
/// - [`crate::infrastructure::bus::RedisInvalidationBus`] - Redis pub/sub with retry
/// - [`crate::infrastructure::bus::NullInvalidationBus`] - Drops every request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvalidationBus: Send + Sync {
    /// Hands one invalidation request to the bus.
    async fn submit(&self, request: InvalidationRequest);

    /// Checks if the bus backend is reachable.
    async fn health_check(&self) -> bool;
}
