//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`UrlRewrite`] - A stored request path to target path mapping
//! - [`EntityType`] - What a rewrite points to (product, category, CMS page, custom)
//! - [`RedirectType`] - Redirect semantics of a rewrite
//!
//! Creation and partial updates use the separate [`NewUrlRewrite`] and
//! [`UrlRewritePatch`] structs.

pub mod entity_type;
pub mod url_rewrite;

pub use entity_type::EntityType;
pub use url_rewrite::{NewUrlRewrite, RedirectType, UrlRewrite, UrlRewritePatch};
