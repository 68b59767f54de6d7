//! Feature modules implementing the validation API
//!
//! Each feature is organized as a vertical slice with its own commands and
//! routes.
//!
//! # Features
//!
//! - **validation**: URL, tracked URL, and file upload validation of GTFS feeds
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Operations that drive the rule engine
//! - `routes.rs` - HTTP route definitions
//! - `ingestion.rs` - Request body normalization (validation only)

pub mod shared;
pub mod validation;

use std::sync::Arc;

use axum::Router;

use crate::config::{Config, ValidationConfig};
use crate::staging::StagingManager;
use crate::telemetry::Telemetry;
use crate::validator::{self, FeedValidator};

/// Shared state for all feature routes
///
/// Holds no per-request data: every request owns its staging directory and
/// source, so clones can serve requests fully in parallel.
#[derive(Clone)]
pub struct FeatureState {
    /// Rule engine backend
    pub validator: Arc<dyn FeedValidator>,
    /// Allocator for per-request staging directories
    pub staging: StagingManager,
    pub telemetry: Telemetry,
    /// Budgets and upload limits
    pub limits: Arc<ValidationConfig>,
}

impl FeatureState {
    pub fn new(
        validator: Arc<dyn FeedValidator>,
        staging: StagingManager,
        telemetry: Telemetry,
        limits: ValidationConfig,
    ) -> Self {
        Self {
            validator,
            staging,
            telemetry,
            limits: Arc::new(limits),
        }
    }

    /// Wire up the configured backend, staging root, and telemetry sink
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            validator::from_backend(&config.validation.backend)?,
            StagingManager::new(config.validation.staging_dir.clone()),
            Telemetry::from_config(&config.telemetry)?,
            config.validation.clone(),
        ))
    }
}

/// Creates the router with all feature routes mounted at the root
///
/// - `/validate`, `/validate-with-tracking`, `/validate-file`
/// - `/api/validate`, `/api/validate/url`, `/api/validate/file`
pub fn router(state: FeatureState) -> Router<()> {
    let max_upload_bytes = state.limits.max_upload_bytes;
    validation::validation_routes(max_upload_bytes).with_state(state)
}
