//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgUrlRewriteRepository`] - URL rewrite storage and retrieval

pub mod pg_url_rewrite_repository;

pub use pg_url_rewrite_repository::PgUrlRewriteRepository;
