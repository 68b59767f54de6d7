//! GTFS Accessibility Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the GTFS accessibility
//! validation service and its command-line client.
//!
//! # Overview
//!
//! - **Types**: the accessibility report produced by the rule engine and the
//!   response envelope every validation endpoint returns
//! - **Error Handling**: common error and result types
//! - **Logging**: `tracing` subscriber setup shared by all binaries
//!
//! # Example
//!
//! ```no_run
//! use gtfs_a11y_common::types::{ResponseEnvelope, ValidationReport};
//!
//! fn show(body: &[u8]) -> gtfs_a11y_common::Result<()> {
//!     let envelope: ResponseEnvelope = serde_json::from_slice(body)?;
//!     let report: ValidationReport = envelope.into_result()?;
//!     println!("{} rules checked for {}", report.stats.len(), report.agency);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{A11yError, Result};
