//! Error types for the Rebill client.
//!
//! All fallible operations in this crate return [`Result`], built on
//! [`ClientError`]. Remote failures are surfaced to the caller unmodified;
//! the only downgraded case is an ineligible invoice transition, which the
//! mark-* actions report as `Ok(false)` rather than an error because it is
//! an expected outcome (for example, double-marking an already collected
//! invoice).

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the billing API.
///
/// # Error Recovery
///
/// - [`Http`](Self::Http): transient network failure, safe to retry
/// - [`Api`](Self::Api): the service rejected the request; inspect the
///   status and message
/// - [`Decode`](Self::Decode): the response body did not match the expected
///   representation, usually an API version mismatch
/// - [`InvalidConfig`](Self::InvalidConfig) /
///   [`InvalidUrl`](Self::InvalidUrl): programmer error, fix the input
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    ///
    /// Wraps [`reqwest::Error`]: timeouts, DNS failures, refused
    /// connections, TLS errors.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The billing service returned a non-success status.
    ///
    /// Carries the HTTP status and the error message extracted from the
    /// response body when one was present.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Error message from the response body, or a generic fallback.
        message: String,
    },

    /// A response body could not be decoded into the expected resource.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Client configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A URL or request path failed validation.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Returns true when this error is an API response with the given
    /// status code.
    #[must_use]
    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, Self::Api { status, .. } if *status == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let error = ClientError::Api { status: 422, message: "invoice is not open".into() };
        assert_eq!(error.to_string(), "API error (status 422): invoice is not open");
    }

    #[test]
    fn test_decode_error_display() {
        let error = ClientError::Decode("missing field `uuid`".into());
        assert!(error.to_string().contains("missing field `uuid`"));
    }

    #[test]
    fn test_invalid_config_display() {
        let error = ClientError::InvalidConfig("base_url must use HTTPS".into());
        assert!(error.to_string().contains("HTTPS"));
    }

    #[test]
    fn test_is_status() {
        let not_found = ClientError::Api { status: 404, message: "not found".into() };
        assert!(not_found.is_status(404));
        assert!(!not_found.is_status(422));

        let decode = ClientError::Decode("bad".into());
        assert!(!decode.is_status(404));
    }
}
