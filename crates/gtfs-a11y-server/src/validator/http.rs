//! Rule engine reached over HTTP
//!
//! URL sources are sent as `{"gtfsUrl": ...}` JSON; file sources are uploaded
//! as a multipart `gtfs` part read from the staged path.

use async_trait::async_trait;
use gtfs_a11y_common::types::ValidationReport;
use reqwest::{multipart, Client, StatusCode};
use serde_json::json;
use tracing::{debug, instrument};

use super::{FeedValidator, InvokeError, ValidationSource};

/// Longest response body excerpt kept in an error.
const BODY_EXCERPT_CHARS: usize = 2048;

#[derive(Debug, Clone)]
pub struct HttpValidator {
    client: Client,
    endpoint: String,
}

impl HttpValidator {
    pub fn new(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gtfs-a11y-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn request(&self, source: &ValidationSource) -> Result<reqwest::RequestBuilder, InvokeError> {
        let request = match source {
            ValidationSource::Url { url } => {
                self.client.post(&self.endpoint).json(&json!({ "gtfsUrl": url }))
            }
            ValidationSource::File {
                staged_path,
                original_name,
            } => {
                let bytes = tokio::fs::read(staged_path).await.map_err(|e| {
                    InvokeError::Unavailable(format!(
                        "failed to read staged feed {}: {}",
                        staged_path.display(),
                        e
                    ))
                })?;
                let part = multipart::Part::bytes(bytes)
                    .file_name(original_name.clone())
                    .mime_str("application/zip")
                    .map_err(|e| InvokeError::Unavailable(e.to_string()))?;

                self.client
                    .post(&self.endpoint)
                    .multipart(multipart::Form::new().part("gtfs", part))
            }
        };

        Ok(request)
    }
}

#[async_trait]
impl FeedValidator for HttpValidator {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn validate(&self, source: &ValidationSource) -> Result<ValidationReport, InvokeError> {
        let response = self
            .request(source)
            .await?
            .send()
            .await
            .map_err(|e| InvokeError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| InvokeError::Network(e.to_string()))?;

        debug!(%status, bytes = body.len(), "Rule engine responded");

        if status.is_success() {
            return ValidationReport::from_json(&body)
                .map_err(|e| InvokeError::MalformedReport(e.to_string()));
        }

        let detail = format!(
            "{} answered {}: {}",
            self.endpoint,
            status,
            String::from_utf8_lossy(&body)
                .chars()
                .take(BODY_EXCERPT_CHARS)
                .collect::<String>()
        );

        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            Err(InvokeError::Rejected(detail))
        } else {
            Err(InvokeError::Unavailable(detail))
        }
    }
}
