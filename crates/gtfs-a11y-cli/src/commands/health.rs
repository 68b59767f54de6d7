//! `gtfs-a11y health` command implementation

use crate::api::ApiClient;
use crate::error::{CliError, Result};
use colored::Colorize;

/// Check that the validation server answers on `/health`
pub async fn run(server_url: &str) -> Result<()> {
    let client = ApiClient::new(server_url)?;

    if client.health_check().await? {
        println!("{} Server at {} is healthy", "✓".green(), server_url);
        Ok(())
    } else {
        Err(CliError::api(format!("{} is not reachable", server_url)))
    }
}
