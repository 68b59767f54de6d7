//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod health;
pub mod validate;
