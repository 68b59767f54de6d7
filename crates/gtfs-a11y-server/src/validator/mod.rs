//! Boundary to the external accessibility rule engine
//!
//! The rule engine is opaque: it takes either a local feed path or a remote
//! feed URL and answers with a [`ValidationReport`]. [`FeedValidator`] is the
//! seam; [`ProcessValidator`] and [`HttpValidator`] are the two ways of
//! reaching a real engine. [`invoke`] wraps any of them with source checks and
//! the endpoint's execution budget.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gtfs_a11y_common::types::ValidationReport;
use thiserror::Error;

use crate::config::ValidatorBackend;

pub mod http;
pub mod process;

pub use http::HttpValidator;
pub use process::ProcessValidator;

/// What the rule engine should read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationSource {
    /// Remote zipped feed
    Url { url: String },
    /// Uploaded feed staged for the lifetime of one request
    File {
        staged_path: PathBuf,
        original_name: String,
    },
}

impl ValidationSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationSource::Url { .. } => "url",
            ValidationSource::File { .. } => "file",
        }
    }

    /// URL sources must be absolute http(s) URLs.
    pub fn check(&self) -> Result<(), InvokeError> {
        let ValidationSource::Url { url } = self else {
            return Ok(());
        };

        let parsed = url::Url::parse(url)
            .map_err(|e| InvokeError::InvalidSource(format!("'{url}' is not a valid URL: {e}")))?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(InvokeError::InvalidSource(format!(
                "unsupported URL scheme '{scheme}'"
            ))),
        }
    }
}

/// Why the rule engine produced no report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("feed rejected: {0}")]
    Rejected(String),

    #[error("rule engine unavailable: {0}")]
    Unavailable(String),

    #[error("malformed report: {0}")]
    MalformedReport(String),

    #[error("rule engine did not finish within {0:?}")]
    Timeout(Duration),
}

impl InvokeError {
    pub fn code(&self) -> &'static str {
        match self {
            InvokeError::InvalidSource(_) => "INVALID_SOURCE",
            InvokeError::Network(_) => "NETWORK_FAILURE",
            InvokeError::Rejected(_) => "FEED_REJECTED",
            InvokeError::Unavailable(_) => "VALIDATOR_UNAVAILABLE",
            InvokeError::MalformedReport(_) => "MALFORMED_REPORT",
            InvokeError::Timeout(_) => "VALIDATION_TIMEOUT",
        }
    }
}

/// An accessibility rule engine
#[async_trait]
pub trait FeedValidator: Send + Sync {
    async fn validate(&self, source: &ValidationSource) -> Result<ValidationReport, InvokeError>;
}

/// Build the configured rule engine backend.
pub fn from_backend(backend: &ValidatorBackend) -> anyhow::Result<Arc<dyn FeedValidator>> {
    let validator: Arc<dyn FeedValidator> = match backend {
        ValidatorBackend::Process { command, args } => {
            Arc::new(ProcessValidator::new(command.clone(), args.clone()))
        }
        ValidatorBackend::Http { url } => Arc::new(HttpValidator::new(url.clone())?),
    };
    Ok(validator)
}

/// Run `validator` on `source`, bounded by `budget`.
///
/// When the budget runs out the pending call is dropped, which abandons the
/// engine (the process backend kills its child) before the caller continues.
#[tracing::instrument(skip(validator), fields(kind = source.kind()))]
pub async fn invoke(
    validator: &dyn FeedValidator,
    source: &ValidationSource,
    budget: Duration,
) -> Result<ValidationReport, InvokeError> {
    source.check()?;

    match tokio::time::timeout(budget, validator.validate(source)).await {
        Ok(result) => result.map(ValidationReport::normalized),
        Err(_) => Err(InvokeError::Timeout(budget)),
    }
}
