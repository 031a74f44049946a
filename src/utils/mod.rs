//! Utility functions shared across the application.
//!
//! - [`request_path`] - Request/target path normalization and validation

pub mod request_path;
