//! Unified error handling for gridctl-core
//!
//! Only fatal conditions live here. Classified poll outcomes (a create that
//! failed, a watch that timed out) travel as ordinary return values until a
//! workflow decides they are failures; at that point they become
//! `OperationFailed` / `OperationTimeout`.

use std::time::Duration;

use grid_api::ApiError;
use thiserror::Error;

/// Core error type for workflows and polling components
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error from the Grid API (control plane, identity or table storage)
    #[error("Grid API error: {0}")]
    Api(#[from] ApiError),

    /// A watched operation did not reach a terminal state in time
    #[error("operation on cluster '{name}' timed out after {timeout:?}")]
    OperationTimeout { name: String, timeout: Duration },

    /// A watched operation reached a terminal failure state
    #[error("operation on cluster '{name}' failed: {reason}")]
    OperationFailed { name: String, reason: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::Api(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if this is an authentication/authorization error
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CoreError::Api(e) => e.is_unauthorized(),
            _ => false,
        }
    }

    /// Returns true if this is a timeout of any kind
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::OperationTimeout { .. })
    }

    /// Returns true if retrying the whole command could plausibly succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Api(e) => e.is_retryable(),
            CoreError::OperationTimeout { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_delegate_predicates() {
        let err: CoreError = ApiError::NotFound {
            message: "no such cluster".into(),
        }
        .into();
        assert!(err.is_not_found());
        assert!(!err.is_retryable());

        let err: CoreError = ApiError::ServerError {
            message: "boom".into(),
        }
        .into();
        assert!(err.is_retryable());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_operation_timeout_is_retryable() {
        let err = CoreError::OperationTimeout {
            name: "etl-prod".into(),
            timeout: Duration::from_secs(1800),
        };
        assert!(err.is_timeout());
        assert!(err.is_retryable());
        assert!(err.to_string().contains("etl-prod"));
    }

    #[test]
    fn test_operation_failed_display_carries_reason() {
        let err = CoreError::OperationFailed {
            name: "etl-prod".into(),
            reason: "provisioning state Failed".into(),
        };
        assert!(err.to_string().contains("provisioning state Failed"));
        assert!(!err.is_retryable());
    }
}
