//! Build automation tasks for gtfs-a11y
//!
//! - Generating CLI documentation from the clap definitions

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for gtfs-a11y", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &Path) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<gtfs_a11y_cli::Cli>();

    let content = format!(
        r#"# gtfs-a11y CLI Reference

This documentation is generated from the CLI source code. Last updated: {}.

## Overview

`gtfs-a11y` sends a GTFS feed to the accessibility validation server and prints
the pass/fail report, either as a table or as JSON.

## Installation

```bash
cargo install --path crates/gtfs-a11y-cli
```

## Quick Start

```bash
# Check that the server is up
gtfs-a11y health

# Validate a published feed
gtfs-a11y validate --url https://example.com/gtfs.zip

# Validate a local archive and fail CI on any failed check
gtfs-a11y validate --file ./gtfs.zip --strict

# Machine-readable output
gtfs-a11y --format json validate --url https://example.com/gtfs.zip
```

## Commands

{}

## Environment Variables

- `GTFS_A11Y_SERVER_URL` - Validation server URL (default: `http://localhost:8000`)
- `GTFS_A11Y_API_TIMEOUT_SECS` - Request timeout in seconds (default: `300`)
- `RUST_LOG` - Logging level (e.g., `debug`, `info`, `warn`, `error`)

## Exit Status

- `0` - the server returned a report (and, with `--strict`, every check passed)
- `1` - the request failed, the server rejected the feed, or a check failed under `--strict`

---

*To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    fs::create_dir_all(output_dir)?;

    let file_path = output_dir.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
