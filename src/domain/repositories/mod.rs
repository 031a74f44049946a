//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Testing
//!
//! See integration tests in `tests/repository_url_rewrite.rs` for usage examples.

pub mod url_rewrite_repository;

pub use url_rewrite_repository::UrlRewriteRepository;

#[cfg(test)]
pub use url_rewrite_repository::MockUrlRewriteRepository;
