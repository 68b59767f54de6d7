//! Common test utilities for validation server integration tests
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the rule
//! engine is replaced by [`StubValidator`] and staging happens under a fresh
//! temporary root per test.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestApp, StubValidator};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new(StubValidator::returning(common::metro_report()));
//!     let (status, body) = app.post_json("/validate", r#"{"url":"https://example.com/feed.zip"}"#).await;
//!     assert_eq!(status, 200);
//! }
//! ```

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gtfs_a11y_common::types::ValidationReport;
use gtfs_a11y_server::{
    api,
    config::{Config, ValidationConfig},
    features::FeatureState,
    staging::StagingManager,
    telemetry::{Telemetry, TelemetryEvent, TelemetrySink},
    validator::{FeedValidator, InvokeError, ValidationSource},
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "----gtfs-a11y-test-boundary";

/// The report returned by the stub in scenario tests
pub fn metro_report_json() -> Value {
    json!({
        "agency": "Metro",
        "feed_version": "1.0",
        "feed_start_date": 20240101,
        "feed_end_date": 20241231,
        "stats": [
            {"name": "wheelchair_accessible field", "status": "pass", "value": "100%"}
        ]
    })
}

pub fn metro_report() -> ValidationReport {
    serde_json::from_value(metro_report_json()).unwrap()
}

/// Bytes that pass the zip signature check
pub fn zip_payload(len: usize, fill: u8) -> Vec<u8> {
    let mut bytes = b"PK\x03\x04".to_vec();
    bytes.resize(len.max(4), fill);
    bytes
}

// ============================================================================
// Rule engine and telemetry doubles
// ============================================================================

#[derive(Debug, Clone)]
pub struct ObservedCall {
    pub source: ValidationSource,
    pub staged_bytes: Option<Vec<u8>>,
}

#[derive(Clone)]
pub struct StubValidator {
    outcome: Result<ValidationReport, InvokeError>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<ObservedCall>>>,
}

impl StubValidator {
    pub fn returning(report: ValidationReport) -> Self {
        Self {
            outcome: Ok(report),
            delay: None,
            calls: Arc::default(),
        }
    }

    pub fn failing(err: InvokeError) -> Self {
        Self {
            outcome: Err(err),
            delay: None,
            calls: Arc::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<ObservedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedValidator for StubValidator {
    async fn validate(&self, source: &ValidationSource) -> Result<ValidationReport, InvokeError> {
        let staged_bytes = match source {
            ValidationSource::File { staged_path, .. } => tokio::fs::read(staged_path).await.ok(),
            ValidationSource::Url { .. } => None,
        };
        self.calls.lock().unwrap().push(ObservedCall {
            source: source.clone(),
            staged_bytes,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Poll until `count` events arrived or a second has passed
    pub async fn wait_for(&self, count: usize) -> Vec<TelemetryEvent> {
        for _ in 0..100 {
            if self.events().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.events()
    }
}

#[async_trait]
impl TelemetrySink for RecordingSink {
    async fn emit(&self, event: &TelemetryEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            anyhow::bail!("collector returned 503");
        }
        Ok(())
    }
}

// ============================================================================
// Test application
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub validator: StubValidator,
    pub sink: RecordingSink,
    pub staging_root: TempDir,
}

impl TestApp {
    pub fn new(validator: StubValidator) -> Self {
        Self::with(validator, RecordingSink::default(), ValidationConfig::default())
    }

    pub fn with(validator: StubValidator, sink: RecordingSink, mut limits: ValidationConfig) -> Self {
        let staging_root = tempfile::tempdir().unwrap();
        limits.staging_dir = staging_root.path().to_path_buf();

        let state = FeatureState::new(
            Arc::new(validator.clone()),
            StagingManager::new(staging_root.path()),
            Telemetry::new(Arc::new(sink.clone()), Duration::from_secs(1)),
            limits,
        );
        let router = api::create_router(state, &Config::default());

        Self {
            router,
            validator,
            sink,
            staging_root,
        }
    }

    /// Entries currently under the staging root
    pub fn staged_entries(&self) -> usize {
        std::fs::read_dir(self.staging_root.path())
            .map(|dir| dir.count())
            .unwrap_or(0)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
        };

        (status, value)
    }

    pub async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_multipart(&self, uri: &str, form: Multipart) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(form.finish()))
                .unwrap(),
        )
        .await
    }
}

// ============================================================================
// Multipart body builder
// ============================================================================

#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, field: &str, file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> Self {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        if let Some(content_type) = content_type {
            self.body
                .extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        self.body.extend_from_slice(b"\r\n");
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, field: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// A single zip upload in the `file` field
pub fn zip_upload(file_name: &str, bytes: &[u8]) -> Multipart {
    Multipart::new().file("file", file_name, Some("application/zip"), bytes)
}
