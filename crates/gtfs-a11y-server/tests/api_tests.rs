//! API integration tests for the validation server
//!
//! These tests drive the full router, middleware included, against a stub
//! rule engine.
//!
//! Coverage includes:
//! - URL, tracked URL, and file validation envelopes
//! - Missing input and upload constraint violations
//! - Staging cleanup on success, failure, and timeout
//! - Parallel uploads
//! - Telemetry isolation

use std::collections::HashSet;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use gtfs_a11y_server::{
    config::{ValidationConfig, DEFAULT_MAX_UPLOAD_BYTES},
    telemetry::GTFS_UPLOADED_EVENT,
    validator::{InvokeError, ValidationSource},
};
use serde_json::json;

mod common;
use common::*;

const FEED_URL_BODY: &str = r#"{"url":"https://example.com/feed.zip"}"#;

// ============================================================================
// Service endpoints
// ============================================================================

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::new(StubValidator::returning(metro_report()));

    let (status, body) = app
        .send(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");

    let (status, body) = app
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
}

// ============================================================================
// URL validation
// ============================================================================

#[tokio::test]
async fn test_validate_url_returns_report() {
    let app = TestApp::new(StubValidator::returning(metro_report()));

    let (status, body) = app.post_json("/validate", FEED_URL_BODY).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "results": metro_report_json()}));
    assert_eq!(app.staged_entries(), 0);

    let calls = app.validator.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(
        &calls[0].source,
        ValidationSource::Url { url } if url == "https://example.com/feed.zip"
    ));
}

#[tokio::test]
async fn test_validate_url_without_json_content_type() {
    let app = TestApp::new(StubValidator::returning(metro_report()));

    // curl -d sends form-urlencoded; fetch with a string body sends text/plain
    let requests = [
        Request::builder().method("POST").uri("/validate"),
        Request::builder()
            .method("POST")
            .uri("/validate")
            .header("content-type", "text/plain;charset=UTF-8"),
        Request::builder()
            .method("POST")
            .uri("/validate-with-tracking")
            .header("content-type", "application/x-www-form-urlencoded"),
    ];

    for request in requests {
        let (status, body) = app
            .send(request.body(Body::from(FEED_URL_BODY)).unwrap())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "results": metro_report_json()}));
    }

    assert_eq!(app.validator.calls().len(), 3);
}

#[tokio::test]
async fn test_validate_missing_url() {
    let app = TestApp::new(StubValidator::returning(metro_report()));

    for body in ["{}", r#"{"url":""}"#, "null"] {
        let (status, envelope) = app.post_json("/validate", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            envelope,
            json!({"success": false, "error": "Missing URL", "code": "MISSING_INPUT"})
        );
    }

    assert!(app.validator.calls().is_empty());
    assert_eq!(app.staged_entries(), 0);
}

#[tokio::test]
async fn test_validate_unreachable_feed() {
    let app = TestApp::new(StubValidator::failing(InvokeError::Network(
        "error sending request for url (https://example.com/feed.zip)".to_string(),
    )));

    let (status, body) = app.post_json("/validate", FEED_URL_BODY).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": "Unable to process GTFS", "code": "NETWORK_FAILURE"})
    );
}

#[tokio::test]
async fn test_validate_malformed_url() {
    let app = TestApp::new(StubValidator::returning(metro_report()));

    let (status, body) = app.post_json("/validate", r#"{"url":"feed.zip"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unable to process GTFS");
    assert_eq!(body["code"], "INVALID_SOURCE");
    assert!(app.validator.calls().is_empty());
}

// ============================================================================
// Tracked URL validation
// ============================================================================

#[tokio::test]
async fn test_tracked_validation_emits_event() {
    let app = TestApp::with(
        StubValidator::returning(metro_report()),
        RecordingSink::default(),
        ValidationConfig::default(),
    );

    let (status, body) = app.post_json("/validate-with-tracking", FEED_URL_BODY).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let events = app.sink.wait_for(1).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, GTFS_UPLOADED_EVENT);
    assert_eq!(events[0].attributes["url"], "https://example.com/feed.zip");
}

#[tokio::test]
async fn test_telemetry_failure_does_not_affect_response() {
    let app = TestApp::with(
        StubValidator::returning(metro_report()),
        RecordingSink::failing(),
        ValidationConfig::default(),
    );

    let (status, body) = app.post_json("/api/validate/url", FEED_URL_BODY).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "results": metro_report_json()}));
    assert_eq!(app.sink.wait_for(1).await.len(), 1);
}

#[tokio::test]
async fn test_failed_tracked_validation_emits_nothing() {
    let app = TestApp::with(
        StubValidator::failing(InvokeError::Rejected("not a GTFS feed".to_string())),
        RecordingSink::default(),
        ValidationConfig::default(),
    );

    let (status, _) = app.post_json("/validate-with-tracking", FEED_URL_BODY).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.sink.events().is_empty());
}

// ============================================================================
// File validation
// ============================================================================

#[tokio::test]
async fn test_validate_file_stages_and_cleans_up() {
    let app = TestApp::new(StubValidator::returning(metro_report()));
    let payload = zip_payload(2048, b'x');

    let (status, body) = app
        .post_multipart("/validate-file", zip_upload("my transit feed.zip", &payload))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "results": metro_report_json()}));

    let calls = app.validator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].staged_bytes.as_deref(), Some(payload.as_slice()));
    match &calls[0].source {
        ValidationSource::File {
            staged_path,
            original_name,
        } => {
            assert_eq!(original_name, "my_transit_feed.zip");
            assert!(staged_path.starts_with(app.staging_root.path()));
            assert!(staged_path.ends_with("my_transit_feed.zip"));
        }
        other => panic!("unexpected source: {other:?}"),
    }

    assert_eq!(app.staged_entries(), 0);
}

#[tokio::test]
async fn test_validate_file_engine_failure_cleans_up() {
    let app = TestApp::new(StubValidator::failing(InvokeError::Rejected(
        "Invalid or unsupported zip format".to_string(),
    )));

    let (status, body) = app
        .post_multipart("/validate-file", zip_upload("feed.zip", &zip_payload(512, 0)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": "Unable to process GTFS", "code": "FEED_REJECTED"})
    );
    assert_eq!(app.validator.calls().len(), 1);
    assert_eq!(app.staged_entries(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_validate_file_timeout_cleans_up() {
    let limits = ValidationConfig {
        file_budget_secs: 300,
        ..ValidationConfig::default()
    };
    let app = TestApp::with(
        StubValidator::returning(metro_report()).with_delay(Duration::from_secs(3600)),
        RecordingSink::default(),
        limits,
    );

    let (status, body) = app
        .post_multipart("/api/validate/file", zip_upload("feed.zip", &zip_payload(512, 0)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unable to process GTFS");
    assert_eq!(body["code"], "VALIDATION_TIMEOUT");
    assert_eq!(app.staged_entries(), 0);
}

#[tokio::test]
async fn test_validate_file_without_file_part() {
    let app = TestApp::new(StubValidator::returning(metro_report()));

    let (status, body) = app
        .post_multipart("/validate-file", Multipart::new().text("note", "hello"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": "No files received", "code": "MISSING_INPUT"})
    );
    assert_eq!(app.staged_entries(), 0);
}

#[tokio::test]
async fn test_upload_at_limit_is_accepted() {
    let app = TestApp::new(StubValidator::returning(metro_report()));
    let payload = zip_payload(DEFAULT_MAX_UPLOAD_BYTES, b'g');

    let (status, body) = app
        .post_multipart("/validate-file", zip_upload("feed.zip", &payload))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        app.validator.calls()[0].staged_bytes.as_ref().map(Vec::len),
        Some(DEFAULT_MAX_UPLOAD_BYTES)
    );
    assert_eq!(app.staged_entries(), 0);
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected_before_staging() {
    let app = TestApp::new(StubValidator::returning(metro_report()));
    let payload = zip_payload(DEFAULT_MAX_UPLOAD_BYTES + 1, b'g');

    let (status, body) = app
        .post_multipart("/validate-file", zip_upload("feed.zip", &payload))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNSUPPORTED_UPLOAD");
    assert_eq!(body["error"], "File is larger than the 20 MiB upload limit");
    assert!(app.validator.calls().is_empty());
    assert_eq!(app.staged_entries(), 0);
}

#[tokio::test]
async fn test_upload_far_over_body_limit_is_rejected() {
    let limits = ValidationConfig {
        max_upload_bytes: 1024,
        ..ValidationConfig::default()
    };
    let app = TestApp::with(
        StubValidator::returning(metro_report()),
        RecordingSink::default(),
        limits,
    );
    let payload = zip_payload(512 * 1024, b'g');

    let (status, body) = app
        .post_multipart("/validate-file", zip_upload("feed.zip", &payload))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNSUPPORTED_UPLOAD");
    assert!(app.validator.calls().is_empty());
}

#[tokio::test]
async fn test_upload_constraint_violations() {
    let zip = zip_payload(256, 0);
    let cases = vec![
        (
            Multipart::new().file("file", "stops.txt", Some("text/plain"), b"stop_id,stop_name"),
            "Unsupported file type text/plain: upload a zipped GTFS feed (.zip)",
        ),
        (
            zip_upload("a.zip", &zip).file("file", "b.zip", Some("application/zip"), &zip),
            "Only one file can be validated per request",
        ),
        (
            zip_upload("feed.zip", b"agency_id,agency_name\n1,Metro"),
            "File is not a valid zip archive",
        ),
    ];

    for (form, message) in cases {
        let app = TestApp::new(StubValidator::returning(metro_report()));
        let (status, body) = app.post_multipart("/validate-file", form).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{message}");
        assert_eq!(
            body,
            json!({"success": false, "error": message, "code": "UNSUPPORTED_UPLOAD"})
        );
        assert!(app.validator.calls().is_empty());
        assert_eq!(app.staged_entries(), 0);
    }
}

#[tokio::test]
async fn test_form_without_selected_file() {
    let app = TestApp::new(StubValidator::returning(metro_report()));
    let form = Multipart::new().file("file", "", Some("application/octet-stream"), b"");

    let (status, body) = app.post_multipart("/validate-file", form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": "No files received", "code": "MISSING_INPUT"})
    );
    assert!(app.validator.calls().is_empty());
    assert_eq!(app.staged_entries(), 0);
}

#[tokio::test]
async fn test_empty_file_slot_beside_real_upload() {
    let app = TestApp::new(StubValidator::returning(metro_report()));
    let form = Multipart::new()
        .file("extra", "", Some("application/octet-stream"), b"")
        .file("file", "feed.zip", Some("application/zip"), &zip_payload(64, 2));

    let (status, _) = app.post_multipart("/validate-file", form).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.validator.calls().len(), 1);
}

#[tokio::test]
async fn test_octet_stream_zip_is_accepted() {
    let app = TestApp::new(StubValidator::returning(metro_report()));
    let form = Multipart::new()
        .text("source", "drag-and-drop")
        .file("gtfs", "feed.ZIP", Some("application/octet-stream"), &zip_payload(64, 1));

    let (status, _) = app.post_multipart("/validate-file", form).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_parallel_uploads_are_isolated() {
    let app = TestApp::new(StubValidator::returning(metro_report()));

    let requests = (0..12u8).map(|i| {
        let payload = zip_payload(4096, i);
        let app = &app;
        async move {
            app.post_multipart("/validate-file", zip_upload("feed.zip", &payload))
                .await
        }
    });
    let responses = futures::future::join_all(requests).await;

    for (status, body) in responses {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let calls = app.validator.calls();
    assert_eq!(calls.len(), 12);

    let dirs: HashSet<_> = calls
        .iter()
        .map(|call| match &call.source {
            ValidationSource::File { staged_path, .. } => staged_path.parent().unwrap().to_path_buf(),
            other => panic!("unexpected source: {other:?}"),
        })
        .collect();
    assert_eq!(dirs.len(), 12);

    // Each request saw exactly its own bytes.
    let fills: HashSet<_> = calls
        .iter()
        .map(|call| {
            let bytes = call.staged_bytes.as_ref().unwrap();
            assert!(bytes[4..].iter().all(|b| *b == bytes[4]));
            bytes[4]
        })
        .collect();
    assert_eq!(fills.len(), 12);
    assert_eq!(app.staged_entries(), 0);
}
