//! `gtfs-a11y validate` command implementation
//!
//! Sends a feed URL or a local zip to the server and prints the report.

use gtfs_a11y_common::types::ValidationReport;
use tracing::info;

use crate::api::ApiClient;
use crate::error::{CliError, Result};
use crate::output::{print_report, OutputFormat};
use crate::progress::create_spinner;
use crate::ValidateArgs;

/// Validate a feed and print the report
pub async fn run(server_url: &str, args: &ValidateArgs, format: OutputFormat) -> Result<()> {
    let client = ApiClient::new(server_url)?;
    let (report, source) = request(&client, args, format).await?;

    print_report(&report, &source, format)?;
    check_strict(&report, args.strict)
}

async fn request(
    client: &ApiClient,
    args: &ValidateArgs,
    format: OutputFormat,
) -> Result<(ValidationReport, String)> {
    let spinner_for =
        |message: String| (format == OutputFormat::Table).then(|| create_spinner(&message));

    let (source, spinner, outcome) = if let Some(url) = &args.url {
        let spinner = spinner_for(format!("Validating {}...", url));
        (url.clone(), spinner, client.validate_url(url, args.track).await)
    } else if let Some(path) = &args.file {
        let spinner = spinner_for(format!("Uploading {}...", path.display()));
        (path.display().to_string(), spinner, client.validate_file(path).await)
    } else {
        return Err(CliError::config("either --url or --file is required"));
    };

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let report = outcome?;
    info!(source = %source, rules = report.stats.len(), "Validation complete");
    Ok((report, source))
}

/// With `--strict`, any failed rule makes the command fail
fn check_strict(report: &ValidationReport, strict: bool) -> Result<()> {
    let failed = report.failures().count();
    if strict && failed > 0 {
        return Err(CliError::ChecksFailed(failed));
    }
    Ok(())
}
