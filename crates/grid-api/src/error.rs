//! Error type for Grid API calls
//!
//! Every remote call in this crate returns `Result<T, ApiError>`. The
//! predicate helpers (`is_not_found`, `is_retryable`, ...) are what callers
//! branch on; matching on variants directly is reserved for display code.

use serde::Deserialize;
use thiserror::Error;

/// Error returned by the Grid control plane, identity endpoint or table
/// storage service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication or authorization failure (401/403)
    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The requested resource does not exist (404)
    #[error("resource not found: {message}")]
    NotFound { message: String },

    /// The request was malformed or rejected by validation (400)
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Too many requests (429)
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// Server-side failure (5xx)
    #[error("server error: {message}")]
    ServerError { message: String },

    /// Any other HTTP error status
    #[error("API error (HTTP {code}): {message}")]
    Api { code: u16, message: String },

    /// Transport-level failure (DNS, TLS, connect, body read)
    #[error("connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// The response decoded but did not have the expected shape
    #[error("invalid response payload: {0}")]
    InvalidResponse(String),
}

/// Result type alias for Grid API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Wire shape of an error body from the control plane
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Build an `ApiError` from a non-success HTTP status and its body.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = parse_error_message(body)
            .unwrap_or_else(|| if body.is_empty() { status.to_string() } else { body.to_string() });

        match status {
            401 | 403 => ApiError::AuthenticationFailed { message },
            404 => ApiError::NotFound { message },
            400 => ApiError::BadRequest { message },
            429 => ApiError::RateLimited { message },
            500..=599 => ApiError::ServerError { message },
            code => ApiError::Api { code, message },
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::AuthenticationFailed { .. })
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::ServerError { .. })
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    /// Returns true if a retry of the same request could plausibly succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::ServerError { .. } | ApiError::RateLimited { .. } => true,
            ApiError::Connection(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Pull a human-readable message out of an error body, tolerating both the
/// nested `{"error": {"code", "message"}}` shape and a flat `{"message"}`.
fn parse_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    if let Some(detail) = parsed.error {
        let message = detail.message?;
        return match detail.code {
            Some(code) => Some(format!("{code}: {message}")),
            None => Some(message),
        };
    }
    parsed.message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_not_found() {
        let err = ApiError::from_status(404, r#"{"error":{"code":"ResourceNotFound","message":"no such cluster"}}"#);
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("ResourceNotFound"));
    }

    #[test]
    fn test_from_status_maps_auth() {
        assert!(ApiError::from_status(401, "").is_unauthorized());
        assert!(ApiError::from_status(403, "").is_unauthorized());
    }

    #[test]
    fn test_from_status_maps_server_errors_as_retryable() {
        let err = ApiError::from_status(503, r#"{"message":"try later"}"#);
        assert!(err.is_server_error());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_status_other_codes() {
        let err = ApiError::from_status(409, r#"{"message":"conflict"}"#);
        match err {
            ApiError::Api { code, message } => {
                assert_eq!(code, 409);
                assert_eq!(message, "conflict");
            }
            other => panic!("expected Api variant, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_body_falls_back_to_raw_text() {
        let err = ApiError::from_status(500, "<html>boom</html>");
        assert!(err.to_string().contains("boom"));
    }
}
