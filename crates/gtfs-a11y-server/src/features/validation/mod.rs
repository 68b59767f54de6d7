//! GTFS accessibility validation
//!
//! Three ingestion modes share one pipeline: the request body is normalized
//! into a [`ValidationSource`](crate::validator::ValidationSource) by
//! [`ingestion`], uploads are staged for the duration of the request, the rule
//! engine is invoked under the endpoint's budget, and the outcome is shaped
//! into a [`ResponseEnvelope`](gtfs_a11y_common::types::ResponseEnvelope).

pub mod commands;
pub mod ingestion;
pub mod routes;

pub use commands::{ValidateFileCommand, ValidateUrlCommand};
pub use routes::validation_routes;
