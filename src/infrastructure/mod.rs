//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and cache invalidation.
//!
//! # Modules
//!
//! - [`bus`] - Invalidation bus (Redis pub/sub and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod bus;
pub mod persistence;
