//! Shared utilities for feature modules
//!
//! # Contents
//!
//! - **test_helpers**: stub rule engine and telemetry fixtures (test-only)

#[cfg(test)]
pub mod test_helpers;
