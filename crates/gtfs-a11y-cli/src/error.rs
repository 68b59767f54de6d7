//! Error types for the gtfs-a11y CLI
//!
//! Messages are user-facing: they say what went wrong and what to try next.

use gtfs_a11y_common::A11yError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The server answered with something other than a validation envelope
    #[error("Server error: {0}. Ensure the validation server is running (check with 'gtfs-a11y health') and accessible.")]
    Api(String),

    /// The server processed the request and reported a failure
    #[error("Validation failed: {message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },

    /// `--strict` was given and at least one check failed
    #[error("{0} accessibility check(s) failed")]
    ChecksFailed(usize),

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions.")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your internet connection and server URL.")]
    Http(#[from] reqwest::Error),

    /// JSON parsing or rendering failed
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables.")]
    Config(String),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create an API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<A11yError> for CliError {
    fn from(err: A11yError) -> Self {
        match err {
            A11yError::Rejected { message, code } => Self::Rejected { message, code },
            A11yError::InvalidReport(msg) => Self::Api(msg),
            A11yError::Serialization(err) => Self::Json(err),
            A11yError::Io(err) => Self::Io(err),
        }
    }
}
