//! Error types for gridctl

use colored::Colorize;
use gridctl_core::CoreError;
use thiserror::Error;

/// Main error type for the gridctl application
#[derive(Error, Debug)]
pub enum GridCtlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Output formatting error: {message}")]
    Output { message: String },
}

/// Result type for gridctl operations
pub type Result<T> = std::result::Result<T, GridCtlError>;

impl GridCtlError {
    /// Helpful follow-ups for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            GridCtlError::Config(_) => vec![
                "Check the configuration file: gridctl --config-file <path> ...".to_string(),
                "Profiles live under [profiles.<name>] with a subscription_id".to_string(),
            ],
            GridCtlError::AuthenticationFailed { .. } => vec![
                "Verify tenant_id and client_id in the active profile".to_string(),
                "Set GRIDCTL_TOKEN to skip interactive token acquisition".to_string(),
            ],
            GridCtlError::Timeout { .. } => vec![
                "Resume watching with: gridctl monitor-create <name> / monitor-delete <name>"
                    .to_string(),
                "Raise the ceiling with --timeout <mins>".to_string(),
            ],
            GridCtlError::Api { message } if message.contains("not found") => vec![
                "List clusters to find the right name: gridctl list".to_string(),
                "Check the --resource-group value".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print the error and its suggestions to stderr, cargo-style.
    pub fn print_diagnostic(&self) {
        eprintln!("{}{} {}", "error".red().bold(), ":".bold(), self);
        for suggestion in self.suggestions() {
            eprintln!("  {}{} {}", "tip".yellow().bold(), ":".bold(), suggestion);
        }
    }
}

impl From<CoreError> for GridCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::OperationTimeout { .. } => GridCtlError::Timeout {
                message: err.to_string(),
            },
            CoreError::OperationFailed { .. } => GridCtlError::OperationFailed {
                message: err.to_string(),
            },
            CoreError::Config(message) => GridCtlError::Config(message),
            CoreError::Api(api) if api.is_unauthorized() => GridCtlError::AuthenticationFailed {
                message: api.to_string(),
            },
            CoreError::Api(api) => GridCtlError::Api {
                message: api.to_string(),
            },
        }
    }
}

impl From<grid_api::ApiError> for GridCtlError {
    fn from(err: grid_api::ApiError) -> Self {
        GridCtlError::from(CoreError::Api(err))
    }
}

impl From<serde_json::Error> for GridCtlError {
    fn from(err: serde_json::Error) -> Self {
        GridCtlError::Output {
            message: format!("JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for GridCtlError {
    fn from(err: std::io::Error) -> Self {
        GridCtlError::Output {
            message: format!("IO error: {err}"),
        }
    }
}
