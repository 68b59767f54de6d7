//! gtfs-a11y CLI - Main entry point

use clap::Parser;
use gtfs_a11y_cli::{commands, Cli, Commands};
use gtfs_a11y_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Pick up GTFS_A11Y_SERVER_URL and friends from a local .env
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Command output owns stdout; logs go to stderr
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Stderr)
        .log_file_prefix("gtfs-a11y-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _log_guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> gtfs_a11y_cli::Result<()> {
    match &cli.command {
        Commands::Validate(args) => {
            commands::validate::run(&cli.server_url, args, cli.format).await
        }
        Commands::Health => commands::health::run(&cli.server_url).await,
    }
}
