//! Best-effort product telemetry
//!
//! [`Telemetry::notify`] never blocks the caller and never reports failure to
//! it: emission runs on its own task, bounded by a timeout, and any error,
//! timeout, or panic in the sink ends up in the logs only.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::TelemetryConfig;

/// Emitted after a tracked URL validation succeeds.
pub const GTFS_UPLOADED_EVENT: &str = "GTFS Uploaded";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

/// Destination for telemetry events
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn emit(&self, event: &TelemetryEvent) -> anyhow::Result<()>;
}

/// Sink used when no collector is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl TelemetrySink for LogSink {
    async fn emit(&self, event: &TelemetryEvent) -> anyhow::Result<()> {
        info!(event = %event.name, attributes = ?event.attributes, "Telemetry event");
        Ok(())
    }
}

/// Posts events as JSON to a collector
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl TelemetrySink for HttpSink {
    async fn emit(&self, event: &TelemetryEvent) -> anyhow::Result<()> {
        self.client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .context("Failed to reach telemetry collector")?
            .error_for_status()
            .context("Telemetry collector refused event")?;
        Ok(())
    }
}

/// Failure-isolated handle to a telemetry sink
#[derive(Clone)]
pub struct Telemetry {
    sink: Arc<dyn TelemetrySink>,
    timeout: Duration,
}

impl Telemetry {
    pub fn new(sink: Arc<dyn TelemetrySink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    /// HTTP sink when a collector endpoint is configured, log sink otherwise
    pub fn from_config(config: &TelemetryConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let sink: Arc<dyn TelemetrySink> = match &config.endpoint {
            Some(endpoint) => Arc::new(HttpSink::new(endpoint.clone(), timeout)?),
            None => Arc::new(LogSink),
        };
        Ok(Self::new(sink, timeout))
    }

    /// Fire `name` with `attributes` in the background.
    ///
    /// The returned handle resolves once emission has finished or been given
    /// up on; it never carries an error.
    pub fn notify<I, K, V>(&self, name: &str, attributes: I) -> JoinHandle<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let event = TelemetryEvent {
            name: name.to_string(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            timestamp: Utc::now(),
        };
        let sink = Arc::clone(&self.sink);
        let timeout = self.timeout;

        tokio::spawn(async move {
            let emission = tokio::spawn(async move {
                let outcome = tokio::time::timeout(timeout, sink.emit(&event)).await;
                (event.name, outcome)
            });

            match emission.await {
                Ok((name, Ok(Ok(())))) => debug!(event = %name, "Telemetry event emitted"),
                Ok((name, Ok(Err(err)))) => {
                    warn!(event = %name, error = %err, "Telemetry emission failed")
                }
                Ok((name, Err(_))) => {
                    warn!(event = %name, ?timeout, "Telemetry emission timed out")
                }
                Err(err) => warn!(error = %err, "Telemetry emission panicked"),
            }
        })
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
