use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection, rejection::BytesRejection, DefaultBodyLimit, Multipart,
        State,
    },
    response::Response,
    routing::post,
    Router,
};
use gtfs_a11y_common::types::ValidationReport;

use crate::api::response::respond;
use crate::error::{MissingInput, ValidationResult};
use crate::features::FeatureState;

use super::{
    commands::{validate_file, validate_url, ValidateFileCommand, ValidateUrlCommand},
    ingestion,
};

/// Room for multipart boundaries and part headers on top of the upload cap.
pub const MULTIPART_FRAMING_ALLOWANCE: usize = 64 * 1024;

pub fn validation_routes(max_upload_bytes: usize) -> Router<FeatureState> {
    let body_limit = DefaultBodyLimit::max(max_upload_bytes.saturating_add(MULTIPART_FRAMING_ALLOWANCE));

    Router::new()
        .route("/validate", post(post_validate))
        .route("/validate-with-tracking", post(post_validate_with_tracking))
        .route("/validate-file", post(post_validate_file).layer(body_limit))
        .route("/api/validate", post(post_validate))
        .route("/api/validate/url", post(post_validate_with_tracking))
        .route("/api/validate/file", post(post_validate_file).layer(body_limit))
}

async fn url_outcome(
    state: &FeatureState,
    body: Result<Bytes, BytesRejection>,
    track: bool,
) -> ValidationResult<ValidationReport> {
    let body = body.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "URL request body unreadable");
        MissingInput::Url
    })?;
    let url = ingestion::feed_url(&body)?;
    validate_url::handle(state, ValidateUrlCommand { url, track }).await
}

async fn file_outcome(
    state: &FeatureState,
    multipart: Result<Multipart, MultipartRejection>,
) -> ValidationResult<ValidationReport> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "Upload is not multipart");
        MissingInput::File
    })?;
    let upload = ingestion::read_upload(&mut multipart, &state.limits).await?;
    validate_file::handle(state, ValidateFileCommand::from(upload)).await
}

#[tracing::instrument(skip_all)]
async fn post_validate(
    State(state): State<FeatureState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    respond(url_outcome(&state, body, false).await)
}

#[tracing::instrument(skip_all)]
async fn post_validate_with_tracking(
    State(state): State<FeatureState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    respond(url_outcome(&state, body, true).await)
}

#[tracing::instrument(skip_all)]
async fn post_validate_file(
    State(state): State<FeatureState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    respond(file_outcome(&state, multipart).await)
}
