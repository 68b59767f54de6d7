//! Test helpers and fixtures for the validation features
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::features::shared::test_helpers::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let validator = StubValidator::returning(metro_report());
//!     let (state, _root) = test_state(validator.clone());
//!     // ... test logic ...
//!     assert_eq!(validator.calls().len(), 1);
//! }
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gtfs_a11y_common::types::{StatStatus, ValidationReport, ValidationStat};
use tempfile::TempDir;

use crate::config::ValidationConfig;
use crate::features::FeatureState;
use crate::staging::StagingManager;
use crate::telemetry::{Telemetry, TelemetryEvent, TelemetrySink};
use crate::validator::{FeedValidator, InvokeError, ValidationSource};

/// The report used across scenario tests
pub fn metro_report() -> ValidationReport {
    ValidationReport {
        agency: "Metro".to_string(),
        feed_version: Some("1.0".to_string()),
        feed_start_date: Some(20240101),
        feed_end_date: Some(20241231),
        stats: vec![ValidationStat {
            name: "wheelchair_accessible field".to_string(),
            status: StatStatus::Pass,
            value: "100%".to_string(),
            routes: None,
            extra: Default::default(),
        }],
        extra: Default::default(),
    }
}

/// What the stub saw on one call
#[derive(Debug, Clone)]
pub struct ObservedCall {
    pub source: ValidationSource,
    /// Contents of the staged file at invocation time
    pub staged_bytes: Option<Vec<u8>>,
}

/// Rule engine double with a fixed outcome
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

    /// Sleep before answering
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
            ValidationSource::File { staged_path, .. } => std::fs::read(staged_path).ok(),
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

/// Telemetry sink that keeps every event, or fails every emission
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<TelemetryEvent>>>,
    pub fail: bool,
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
}

#[async_trait]
impl TelemetrySink for RecordingSink {
    async fn emit(&self, event: &TelemetryEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            anyhow::bail!("collector offline");
        }
        Ok(())
    }
}

/// Feature state over a fresh staging root; keep the `TempDir` alive for the test
pub fn test_state(validator: StubValidator) -> (FeatureState, TempDir) {
    test_state_with(validator, RecordingSink::default(), ValidationConfig::default())
}

pub fn test_state_with(
    validator: StubValidator,
    sink: RecordingSink,
    mut limits: ValidationConfig,
) -> (FeatureState, TempDir) {
    let root = tempfile::tempdir().unwrap();
    limits.staging_dir = root.path().to_path_buf();

    let state = FeatureState::new(
        Arc::new(validator),
        StagingManager::new(root.path()),
        Telemetry::new(Arc::new(sink), Duration::from_secs(1)),
        limits,
    );
    (state, root)
}

/// Number of entries left under a staging root
pub fn staged_entries(root: &TempDir) -> usize {
    std::fs::read_dir(root.path()).map(|dir| dir.count()).unwrap_or(0)
}
