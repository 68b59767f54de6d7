//! GTFS Accessibility Validation Server - Main entry point

use anyhow::Result;
use gtfs_a11y_common::logging::{init_logging, LogConfig};
use gtfs_a11y_server::{api, config::Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Defaults first; environment variables take precedence
    let log_config = LogConfig::builder()
        .log_file_prefix("gtfs-a11y-server")
        .filter_directives("gtfs_a11y_server=debug,tower_http=debug,axum=info")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting GTFS accessibility validation server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await
}
