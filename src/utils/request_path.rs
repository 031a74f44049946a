//! Request and target path normalization.
//!
//! Request paths are stored relative to the store base URL, without a leading
//! slash (`women/tops.html`). Target paths are either relative in the same form
//! or absolute `http(s)` URLs for external redirects.

use url::Url;

/// Maximum stored length of a request or target path.
pub const MAX_PATH_LENGTH: usize = 255;

/// Errors that can occur during path validation.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Path must not be empty")]
    Empty,

    #[error("Path is too long ({0} characters, max 255)")]
    TooLong(usize),

    #[error("Do not use two or more consecutive slashes in the path")]
    ConsecutiveSlashes,

    #[error("Anchor symbol (#) is not supported in the path")]
    Fragment,

    #[error("Query string is not supported in the request path")]
    QueryString,

    #[error("Path must not contain whitespace")]
    Whitespace,

    #[error("Invalid target URL: {0}")]
    InvalidUrl(String),

    #[error("Only HTTP and HTTPS target URLs are allowed")]
    UnsupportedProtocol,
}

/// Normalizes a request path to its stored form.
///
/// # Rules
///
/// 1. Surrounding whitespace and a single leading slash are removed
/// 2. Empty paths, inner whitespace, `//`, `#` and `?` are rejected
/// 3. At most [`MAX_PATH_LENGTH`] characters
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_request_path(" /women/tops.html ").unwrap(), "women/tops.html");
/// assert!(normalize_request_path("women//tops.html").is_err());
/// ```
pub fn normalize_request_path(input: &str) -> Result<String, PathError> {
    let path = normalize_relative(input)?;

    if path.contains('?') {
        return Err(PathError::QueryString);
    }

    Ok(path)
}

/// Validates and normalizes a target path.
///
/// Absolute targets (containing `://`) must be `http` or `https` URLs; their
/// host is lowercased and default ports are dropped. Relative targets follow
/// the request path rules but may carry a query string.
pub fn normalize_target_path(input: &str) -> Result<String, PathError> {
    let trimmed = input.trim();

    if trimmed.contains("://") {
        return normalize_absolute(trimmed);
    }

    normalize_relative(trimmed)
}

fn normalize_relative(input: &str) -> Result<String, PathError> {
    let trimmed = input.trim();
    let path = trimmed.strip_prefix('/').unwrap_or(trimmed);

    if path.is_empty() {
        return Err(PathError::Empty);
    }
    if path.chars().count() > MAX_PATH_LENGTH {
        return Err(PathError::TooLong(path.chars().count()));
    }
    if path.chars().any(char::is_whitespace) {
        return Err(PathError::Whitespace);
    }
    if trimmed.contains("//") {
        return Err(PathError::ConsecutiveSlashes);
    }
    if path.contains('#') {
        return Err(PathError::Fragment);
    }

    Ok(path.to_string())
}

fn normalize_absolute(input: &str) -> Result<String, PathError> {
    let mut url = Url::parse(input).map_err(|e| PathError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(PathError::UnsupportedProtocol),
    }

    if url.fragment().is_some() {
        return Err(PathError::Fragment);
    }

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None)
            .map_err(|_| PathError::InvalidUrl("Failed to remove default port".to_string()))?;
    }

    // `Url` lowercases the host while parsing.
    let normalized = url.to_string();
    if normalized.chars().count() > MAX_PATH_LENGTH {
        return Err(PathError::TooLong(normalized.chars().count()));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_path_strips_leading_slash() {
        assert_eq!(
            normalize_request_path("/women/tops.html").unwrap(),
            "women/tops.html"
        );
    }

    #[test]
    fn test_request_path_trims_whitespace() {
        assert_eq!(
            normalize_request_path("  blue-shirt.html \n").unwrap(),
            "blue-shirt.html"
        );
    }

    #[test]
    fn test_request_path_empty() {
        assert_eq!(normalize_request_path("   "), Err(PathError::Empty));
        assert_eq!(normalize_request_path("/"), Err(PathError::Empty));
    }

    #[test]
    fn test_request_path_consecutive_slashes() {
        assert_eq!(
            normalize_request_path("women//tops.html"),
            Err(PathError::ConsecutiveSlashes)
        );
    }

    #[test]
    fn test_request_path_repeated_leading_slashes() {
        assert_eq!(
            normalize_request_path("///a.html"),
            Err(PathError::ConsecutiveSlashes)
        );
        assert_eq!(
            normalize_target_path("//a.html"),
            Err(PathError::ConsecutiveSlashes)
        );
    }

    #[test]
    fn test_request_path_fragment() {
        assert_eq!(
            normalize_request_path("page.html#top"),
            Err(PathError::Fragment)
        );
    }

    #[test]
    fn test_request_path_query() {
        assert_eq!(
            normalize_request_path("page.html?color=blue"),
            Err(PathError::QueryString)
        );
    }

    #[test]
    fn test_request_path_inner_whitespace() {
        assert_eq!(
            normalize_request_path("blue shirt.html"),
            Err(PathError::Whitespace)
        );
    }

    #[test]
    fn test_request_path_too_long() {
        let long = "a".repeat(MAX_PATH_LENGTH + 1);
        assert_eq!(
            normalize_request_path(&long),
            Err(PathError::TooLong(MAX_PATH_LENGTH + 1))
        );

        let max = "a".repeat(MAX_PATH_LENGTH);
        assert!(normalize_request_path(&max).is_ok());
    }

    #[test]
    fn test_request_path_preserves_case() {
        assert_eq!(normalize_request_path("Sale/Shoes.HTML").unwrap(), "Sale/Shoes.HTML");
    }

    #[test]
    fn test_target_path_relative_allows_query() {
        assert_eq!(
            normalize_target_path("/catalog/product/view/id/42?color=blue").unwrap(),
            "catalog/product/view/id/42?color=blue"
        );
    }

    #[test]
    fn test_target_path_absolute_url() {
        assert_eq!(
            normalize_target_path("https://EXAMPLE.COM:443/landing").unwrap(),
            "https://example.com/landing"
        );
    }

    #[test]
    fn test_target_path_absolute_keeps_custom_port() {
        assert_eq!(
            normalize_target_path("http://example.com:8080/a").unwrap(),
            "http://example.com:8080/a"
        );
    }

    #[test]
    fn test_target_path_rejects_non_http_scheme() {
        assert_eq!(
            normalize_target_path("ftp://example.com/file"),
            Err(PathError::UnsupportedProtocol)
        );
    }

    #[test]
    fn test_target_path_rejects_absolute_fragment() {
        assert_eq!(
            normalize_target_path("https://example.com/page#section"),
            Err(PathError::Fragment)
        );
    }

    #[test]
    fn test_target_path_empty() {
        assert_eq!(normalize_target_path(""), Err(PathError::Empty));
    }
}
