//! Response shaping
//!
//! Every validation endpoint answers with a [`ResponseEnvelope`]: 200 with the
//! report, or 400 with a user-facing message and a machine code. Failure detail
//! is written to the logs here and nowhere else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gtfs_a11y_common::types::{ResponseEnvelope, ValidationReport};

use crate::error::{ValidationError, ValidationResult};

/// Map an outcome onto a status and envelope.
///
/// Pure: the same outcome always produces the same envelope.
pub fn shape(outcome: &ValidationResult<ValidationReport>) -> (StatusCode, ResponseEnvelope) {
    match outcome {
        Ok(report) => (StatusCode::OK, ResponseEnvelope::success(report.clone())),
        Err(err) => (
            err.status(),
            ResponseEnvelope::failure(err.code(), err.public_message()),
        ),
    }
}

fn log_failure(err: &ValidationError) {
    if err.is_validation_failure() {
        tracing::error!(code = err.code(), error = %err, "Validation failed");
    } else {
        tracing::warn!(code = err.code(), error = %err, "Validation request rejected");
    }
}

/// Log the outcome for operators and turn it into an HTTP response.
pub fn respond(outcome: ValidationResult<ValidationReport>) -> Response {
    match &outcome {
        Ok(report) => tracing::info!(
            agency = %report.agency,
            stats = report.stats.len(),
            failures = report.failures().count(),
            "Validation succeeded"
        ),
        Err(err) => log_failure(err),
    }

    let (status, envelope) = shape(&outcome);
    (status, Json(envelope)).into_response()
}
