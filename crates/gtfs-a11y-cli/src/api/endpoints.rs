//! API endpoint URL builders
//!
//! Helper functions to construct API endpoint URLs.

fn base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Build URL validation endpoint, with or without telemetry
pub fn validate_url(base_url: &str, track: bool) -> String {
    if track {
        format!("{}/validate-with-tracking", base(base_url))
    } else {
        format!("{}/validate", base(base_url))
    }
}

/// Build upload validation endpoint
pub fn validate_file_url(base_url: &str) -> String {
    format!("{}/validate-file", base(base_url))
}

/// Build health check URL
pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base(base_url))
}
