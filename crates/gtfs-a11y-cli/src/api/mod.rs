//! API client module
//!
//! HTTP client for the GTFS accessibility validation server.

pub mod client;
pub mod endpoints;

pub use client::ApiClient;
