//! GTFS Accessibility Validation Server Library
//!
//! HTTP service that validates GTFS transit feeds against accessibility rules.
//!
//! # Overview
//!
//! A feed arrives as a remote URL or as an uploaded zip archive. The server
//! normalizes the request into one validation source, stages uploads in a
//! request-scoped directory, runs the external rule engine under a
//! per-endpoint budget, and answers with a uniform success/error envelope.
//!
//! - **API Endpoints**: `/validate`, `/validate-with-tracking`, `/validate-file`
//! - **Staging**: per-request directories removed on every exit path
//! - **Rule engine**: local program or remote HTTP service behind one trait
//! - **Telemetry**: best-effort events that never affect a response
//! - **Configuration**: Environment-based configuration management
//! - **Middleware**: CORS and request logging
//!
//! # Architecture
//!
//! ```text
//! request ─▶ ingestion ─▶ [staging] ─▶ validator::invoke ─▶ api::response
//!                                            │
//!                                            └─▶ telemetry (tracked URLs)
//! ```
//!
//! ## Framework Stack
//!
//! - **Axum**: Modern, ergonomic web framework
//! - **Tower**: Middleware and service abstractions
//! - **tempfile**: Scoped staging directories
//!
//! # Example
//!
//! ```no_run
//! use gtfs_a11y_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod staging;
pub mod telemetry;
pub mod validator;

// Re-export commonly used types
pub use error::{ValidationError, ValidationResult};
