//! Turning raw request bodies into validation sources
//!
//! Every check here runs before a staging directory exists, so a rejected
//! request leaves nothing behind on disk.

use std::io::Cursor;

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart,
    },
    http::StatusCode,
};
use serde::Deserialize;
use tracing::debug;

use crate::config::ValidationConfig;
use crate::error::{MissingInput, UploadViolation, ValidationResult};
use crate::staging::DEFAULT_STAGED_NAME;

const MIB: usize = 1024 * 1024;

/// Multipart field name used by the upload form
pub const FILE_FIELD: &str = "file";

const ZIP_CONTENT_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip-compressed",
    "application/x-zip",
    "multipart/x-zip",
];

/// Local file header, empty archive, and spanned archive signatures
const ZIP_SIGNATURES: &[&[u8; 4]] = &[b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];

/// JSON body of the URL endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// One uploaded archive, checked and held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Extract the feed URL, or fail with `Missing URL`.
///
/// The body is parsed as JSON whatever its declared content type. A body that
/// is not JSON, not an object, or carries a blank `url` counts as missing. URL
/// syntax is left to the invoker.
pub fn feed_url(body: &[u8]) -> ValidationResult<String> {
    let request: UrlRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => {
            debug!(error = %err, "URL request body rejected");
            return Err(MissingInput::Url.into());
        }
    };

    match request.url {
        Some(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        _ => Err(MissingInput::Url.into()),
    }
}

/// Replace spaces so the name is safe as a staged file name.
pub fn sanitize_file_name(name: &str) -> String {
    name.replace(' ', "_")
}

fn upload_error(err: MultipartError, limit: usize) -> UploadViolation {
    debug!(error = %err.body_text(), "Multipart stream failed");
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadViolation::TooLarge {
            limit_mib: limit.div_ceil(MIB),
        }
    } else {
        UploadViolation::Unreadable
    }
}

fn check_content_type(content_type: Option<&str>, file_name: Option<&str>) -> Result<(), UploadViolation> {
    let essence = content_type
        .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase());
    let zip_named = file_name.is_some_and(|name| name.to_ascii_lowercase().ends_with(".zip"));

    match essence.as_deref() {
        Some(ct) if ZIP_CONTENT_TYPES.contains(&ct) => Ok(()),
        None | Some("application/octet-stream") if zip_named => Ok(()),
        other => Err(UploadViolation::UnsupportedType {
            content_type: other.unwrap_or("(none)").to_string(),
        }),
    }
}

fn check_archive(bytes: &[u8], max_uncompressed: Option<u64>) -> Result<(), UploadViolation> {
    let signed = ZIP_SIGNATURES
        .iter()
        .any(|signature| bytes.starts_with(signature.as_slice()));
    if !signed {
        return Err(UploadViolation::NotAnArchive);
    }

    let Some(limit) = max_uncompressed else {
        return Ok(());
    };

    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|_| UploadViolation::NotAnArchive)?;

    let mut total: u64 = 0;
    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|_| UploadViolation::NotAnArchive)?;
        total = total.saturating_add(entry.size());
        if total > limit {
            return Err(UploadViolation::ArchiveTooLarge { limit });
        }
    }

    Ok(())
}

/// Buffer one part, failing as soon as it grows past `max` bytes.
async fn read_part(field: &mut Field<'_>, max: usize) -> Result<Vec<u8>, UploadViolation> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| upload_error(e, max))? {
        if bytes.len() + chunk.len() > max {
            return Err(UploadViolation::TooLarge {
                limit_mib: max.div_ceil(MIB),
            });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Read the single uploaded archive from a multipart body.
///
/// A part counts as the file when it carries a file name or is named `file`;
/// other fields, and an empty part with a blank file name, are ignored. The
/// size cap is enforced while the part streams in, so an oversized upload is
/// never fully buffered.
pub async fn read_upload(
    multipart: &mut Multipart,
    limits: &ValidationConfig,
) -> ValidationResult<Upload> {
    let max = limits.max_upload_bytes;
    let mut upload: Option<Upload> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, max))?
    {
        let file_name = field.file_name().map(str::to_string);
        if file_name.is_none() && field.name() != Some(FILE_FIELD) {
            continue;
        }

        let bytes = read_part(&mut field, max).await?;

        // A form submitted with no file selected sends an empty part with `filename=""`
        let blank_name = file_name.as_deref().map_or(true, |n| n.trim().is_empty());
        if blank_name && bytes.is_empty() {
            continue;
        }

        if upload.is_some() {
            return Err(UploadViolation::MultipleFiles.into());
        }

        check_content_type(field.content_type(), file_name.as_deref())?;

        upload = Some(Upload {
            file_name: sanitize_file_name(
                file_name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(DEFAULT_STAGED_NAME),
            ),
            bytes,
        });
    }

    let upload = upload.ok_or(MissingInput::File)?;
    check_archive(&upload.bytes, limits.max_uncompressed_bytes)?;

    debug!(file_name = %upload.file_name, size = upload.bytes.len(), "Upload accepted");
    Ok(upload)
}
