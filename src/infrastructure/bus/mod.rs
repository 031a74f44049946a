//! Cache invalidation bus.
//!
//! Provides an [`InvalidationBus`] trait with two implementations:
//! - [`RedisInvalidationBus`] - Publishes requests on a Redis pub/sub channel
//! - [`NullInvalidationBus`] - No-op implementation when Redis is not configured

mod null_bus;
mod redis_bus;
mod service;

pub use null_bus::NullInvalidationBus;
pub use redis_bus::RedisInvalidationBus;
pub use service::{BusError, BusResult, InvalidationBus};

#[cfg(test)]
pub use service::MockInvalidationBus;
