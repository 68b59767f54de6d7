//! Rule engine run as a local program
//!
//! The program receives `--gtfsUrl <url>` or `--gtfsPath <path>` after any
//! configured leading arguments and must print the report as JSON on stdout.

use std::process::Stdio;

use async_trait::async_trait;
use gtfs_a11y_common::types::ValidationReport;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::{FeedValidator, InvokeError, ValidationSource};

/// Longest stderr excerpt kept in an error.
const STDERR_EXCERPT_CHARS: usize = 2048;

#[derive(Debug, Clone)]
pub struct ProcessValidator {
    program: String,
    args: Vec<String>,
}

impl ProcessValidator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self, source: &ValidationSource) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);

        match source {
            ValidationSource::Url { url } => {
                command.arg("--gtfsUrl").arg(url);
            }
            ValidationSource::File { staged_path, .. } => {
                command.arg("--gtfsPath").arg(staged_path);
            }
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

fn excerpt(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim()
        .chars()
        .take(STDERR_EXCERPT_CHARS)
        .collect()
}

#[async_trait]
impl FeedValidator for ProcessValidator {
    #[instrument(skip(self), fields(program = %self.program))]
    async fn validate(&self, source: &ValidationSource) -> Result<ValidationReport, InvokeError> {
        let output = self
            .command(source)
            .output()
            .await
            .map_err(|e| InvokeError::Unavailable(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(InvokeError::Rejected(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                excerpt(&output.stderr)
            )));
        }

        debug!(bytes = output.stdout.len(), "Rule engine finished");

        ValidationReport::from_json(&output.stdout)
            .map_err(|e| InvokeError::MalformedReport(e.to_string()))
    }
}
