use serde::{Deserialize, Serialize};

use gtfs_a11y_common::types::ValidationReport;

use crate::config::Endpoint;
use crate::error::ValidationResult;
use crate::features::FeatureState;
use crate::telemetry::GTFS_UPLOADED_EVENT;
use crate::validator::{invoke, ValidationSource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateUrlCommand {
    pub url: String,
    /// Emit a `GTFS Uploaded` event after a successful validation
    #[serde(default)]
    pub track: bool,
}

impl ValidateUrlCommand {
    pub fn endpoint(&self) -> Endpoint {
        if self.track {
            Endpoint::TrackedUrl
        } else {
            Endpoint::Url
        }
    }
}

#[tracing::instrument(skip(state, command), fields(url = %command.url, track = command.track))]
pub async fn handle(
    state: &FeatureState,
    command: ValidateUrlCommand,
) -> ValidationResult<ValidationReport> {
    let budget = state.limits.budget(command.endpoint());
    let source = ValidationSource::Url {
        url: command.url.clone(),
    };

    let report = invoke(state.validator.as_ref(), &source, budget).await?;

    if command.track {
        // Detached: the response never waits on the collector.
        drop(state.telemetry.notify(GTFS_UPLOADED_EVENT, [("url", command.url)]));
    }

    Ok(report)
}
