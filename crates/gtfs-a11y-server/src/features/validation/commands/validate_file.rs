use std::sync::Arc;

use gtfs_a11y_common::types::ValidationReport;

use crate::config::Endpoint;
use crate::error::ValidationResult;
use crate::features::validation::ingestion::Upload;
use crate::features::FeatureState;
use crate::validator::{invoke, ValidationSource};

#[derive(Debug, Clone)]
pub struct ValidateFileCommand {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl From<Upload> for ValidateFileCommand {
    fn from(upload: Upload) -> Self {
        Self {
            file_name: upload.file_name,
            bytes: upload.bytes,
        }
    }
}

/// Stage the upload, validate it, and remove the staging directory.
///
/// The directory is gone by the time this returns, whatever the outcome.
#[tracing::instrument(skip(state, command), fields(file_name = %command.file_name, size = command.bytes.len()))]
pub async fn handle(
    state: &FeatureState,
    command: ValidateFileCommand,
) -> ValidationResult<ValidationReport> {
    let budget = state.limits.budget(Endpoint::File);
    let validator = Arc::clone(&state.validator);
    let original_name = command.file_name.clone();

    state
        .staging
        .with_staged(&command.file_name, &command.bytes, move |staged_path| async move {
            let source = ValidationSource::File {
                staged_path,
                original_name,
            };
            Ok(invoke(validator.as_ref(), &source, budget).await?)
        })
        .await
}
