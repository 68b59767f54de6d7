//! Server-specific error types
//!
//! Every validation request ends either with a report or with one
//! [`ValidationError`]. Input problems ([`MissingInput`], [`UploadViolation`])
//! are detected before any resource is acquired and carry a message meant for
//! the user. Staging and invocation failures are reported to the user with one
//! generic message; their detail only goes to the logs.

use axum::http::StatusCode;
use thiserror::Error;

use crate::staging::StagingError;
use crate::validator::InvokeError;

/// Message returned to users for every staging or invocation failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Unable to process GTFS";

/// Result type alias for validation operations
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// The request carried nothing to validate
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    #[error("Missing URL")]
    Url,

    #[error("No files received")]
    File,
}

/// An upload broke one of the intake constraints
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadViolation {
    #[error("Unsupported file type {content_type}: upload a zipped GTFS feed (.zip)")]
    UnsupportedType { content_type: String },

    #[error("File is larger than the {limit_mib} MiB upload limit")]
    TooLarge { limit_mib: usize },

    #[error("Only one file can be validated per request")]
    MultipleFiles,

    #[error("File is not a valid zip archive")]
    NotAnArchive,

    #[error("Archive expands beyond the allowed {limit} bytes")]
    ArchiveTooLarge { limit: u64 },

    #[error("Upload could not be read")]
    Unreadable,
}

/// Application error type for the validation endpoints
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    MissingInput(MissingInput),

    #[error("{0}")]
    UnsupportedUpload(UploadViolation),

    #[error("Staging failed: {0}")]
    Staging(#[from] StagingError),

    #[error("Validation failed: {0}")]
    Invocation(#[from] InvokeError),
}

impl From<MissingInput> for ValidationError {
    fn from(err: MissingInput) -> Self {
        Self::MissingInput(err)
    }
}

impl From<UploadViolation> for ValidationError {
    fn from(err: UploadViolation) -> Self {
        Self::UnsupportedUpload(err)
    }
}

impl ValidationError {
    /// Every failure is reported as a client error.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Stable machine-readable failure class
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingInput(_) => "MISSING_INPUT",
            ValidationError::UnsupportedUpload(_) => "UNSUPPORTED_UPLOAD",
            ValidationError::Staging(_) => "STAGING_FAILED",
            ValidationError::Invocation(err) => err.code(),
        }
    }

    /// Message safe to show to users: never a path, stderr, or cause chain
    pub fn public_message(&self) -> String {
        match self {
            ValidationError::MissingInput(err) => err.to_string(),
            ValidationError::UnsupportedUpload(err) => err.to_string(),
            ValidationError::Staging(_) | ValidationError::Invocation(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }

    /// Whether the failure happened after input was accepted
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            ValidationError::Staging(_) | ValidationError::Invocation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_input_messages() {
        assert_eq!(
            ValidationError::from(MissingInput::Url).public_message(),
            "Missing URL"
        );
        assert_eq!(
            ValidationError::from(MissingInput::File).public_message(),
            "No files received"
        );
    }

    #[test]
    fn test_upload_violations_surface_their_constraint() {
        let err = ValidationError::from(UploadViolation::TooLarge { limit_mib: 20 });
        assert_eq!(err.code(), "UNSUPPORTED_UPLOAD");
        assert_eq!(err.public_message(), "File is larger than the 20 MiB upload limit");
        assert!(!err.is_validation_failure());
    }

    #[test]
    fn test_invocation_detail_is_hidden() {
        let err = ValidationError::from(InvokeError::Rejected(
            "exit status 1: ENOENT /tmp/gtfs-upload-x/feed.zip".to_string(),
        ));
        assert_eq!(err.public_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.code(), "FEED_REJECTED");
        assert!(err.is_validation_failure());
        assert!(err.to_string().contains("ENOENT"));
    }

    #[test]
    fn test_timeout_has_distinct_code() {
        let err = ValidationError::from(InvokeError::Timeout(Duration::from_secs(60)));
        assert_eq!(err.code(), "VALIDATION_TIMEOUT");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
