//! HTTP API client for the validation server
//!
//! Every validation endpoint answers with the same envelope. Failures come
//! back as `400` with `success: false`, so the body is decoded before the
//! status code is looked at.

use std::path::Path;
use std::time::Duration;

use gtfs_a11y_common::types::{ResponseEnvelope, ValidationReport};
use reqwest::{multipart, Client, Response};
use serde_json::json;
use tracing::debug;

use crate::api::endpoints;
use crate::error::{CliError, Result};

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via GTFS_A11Y_API_TIMEOUT_SECS environment variable.
/// Large feeds can take minutes to check.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Default server URL when not specified via flag or environment variable.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Multipart field the server reads the upload from
const FILE_FIELD: &str = "file";

/// API client for the validation server
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let timeout_secs = std::env::var("GTFS_A11Y_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<bool> {
        let url = endpoints::health_url(&self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Validate a feed the server downloads itself
    pub async fn validate_url(&self, feed_url: &str, track: bool) -> Result<ValidationReport> {
        let url = endpoints::validate_url(&self.base_url, track);
        debug!(%url, feed_url, "Requesting URL validation");

        let response = self
            .client
            .post(&url)
            .json(&json!({ "url": feed_url }))
            .send()
            .await?;

        read_envelope(response).await
    }

    /// Upload a local zip for validation
    pub async fn validate_file(&self, path: &Path) -> Result<ValidationReport> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CliError::FileNotFound(path.display().to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "gtfs.zip".to_string());

        let url = endpoints::validate_file_url(&self.base_url);
        debug!(%url, file_name, size = bytes.len(), "Uploading feed");

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/zip")?;
        let form = multipart::Form::new().part(FILE_FIELD, part);

        let response = self.client.post(&url).multipart(form).send().await?;

        read_envelope(response).await
    }
}

/// Decode the envelope regardless of status, falling back to the status line
async fn read_envelope(response: Response) -> Result<ValidationReport> {
    let status = response.status();
    let body = response.bytes().await?;

    match serde_json::from_slice::<ResponseEnvelope>(&body) {
        Ok(envelope) => Ok(envelope.into_result()?),
        Err(err) if status.is_success() => Err(CliError::api(format!(
            "unexpected response body ({err})"
        ))),
        Err(_) => Err(CliError::api(status.to_string())),
    }
}
