//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, A11yError>;

/// Errors raised while handling accessibility reports and envelopes
#[derive(Error, Debug)]
pub enum A11yError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    /// The service answered with a failure envelope.
    #[error("{message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },
}
