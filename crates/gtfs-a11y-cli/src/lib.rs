//! GTFS Accessibility CLI Library
//!
//! Command-line client for the GTFS accessibility validation server.
//!
//! # Overview
//!
//! - **Validation**: check a feed by URL or upload a local zip (`gtfs-a11y validate`)
//! - **Server checks**: verify the server is reachable (`gtfs-a11y health`)
//!
//! Results are shown as the same pass/fail table the web results page
//! renders, or as raw JSON for scripting.

pub mod api;
pub mod commands;
pub mod error;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use error::{CliError, Result};
pub use output::OutputFormat;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// gtfs-a11y - Validate GTFS feeds against transit accessibility guidelines
#[derive(Parser, Debug)]
#[command(name = "gtfs-a11y")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL
    #[arg(
        long,
        env = "GTFS_A11Y_SERVER_URL",
        default_value = api::client::DEFAULT_SERVER_URL,
        global = true
    )]
    pub server_url: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a GTFS feed
    Validate(ValidateArgs),

    /// Check that the validation server is reachable
    Health,
}

/// Arguments for `gtfs-a11y validate`
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// URL of a zipped GTFS feed
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub url: Option<String>,

    /// Local zipped GTFS feed to upload
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Record the validation in product telemetry (URL feeds only)
    #[arg(long, requires = "url")]
    pub track: bool,

    /// Exit with an error when any accessibility check fails
    #[arg(long)]
    pub strict: bool,
}
