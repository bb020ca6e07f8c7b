//! Long URL validation.
//!
//! Only absolute `http`/`https` URLs with a host are accepted. The URL is
//! stored exactly as submitted (minus surrounding whitespace) so that a
//! resolution returns the same string the owner shortened.

use url::Url;

/// Longest long URL accepted, in characters.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a long URL is rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL cannot be empty")]
    Empty,

    #[error("URL cannot exceed {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("URL must use http or https scheme")]
    UnsupportedProtocol,

    #[error("URL must include a valid host")]
    MissingHost,
}

/// Validates a long URL and returns its trimmed form.
///
/// # Errors
///
/// Returns a [`UrlValidationError`] describing the first rule that failed.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(validate_long_url(" https://example.com/a ").unwrap(), "https://example.com/a");
/// assert!(validate_long_url("javascript:alert(1)").is_err());
/// ```
pub fn validate_long_url(input: &str) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    if trimmed.chars().count() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    let url =
        Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(trimmed.to_string())
}
