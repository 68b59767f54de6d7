//! Rendering of validation reports
//!
//! The table layout follows the results page: one row per rule in engine
//! order, so `#issue-<index>` hints line up with the page's anchors.

use chrono::NaiveDate;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use gtfs_a11y_common::types::{ValidationReport, ValidationStat};

use crate::error::Result;

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// The report as pretty-printed JSON
    Json,
}

/// Print a report in the requested format
pub fn print_report(report: &ValidationReport, source: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print!("{}", format_as_table(report, source)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

/// Format a report as header lines followed by the rule table
pub fn format_as_table(report: &ValidationReport, source: &str) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&format!("{}\n", "Validation Results".bold()));
    out.push_str(&format!("GTFS from {}\n", source.cyan()));
    out.push_str(&format!("Agency: {}\n", report.agency));
    if let Some(version) = &report.feed_version {
        out.push_str(&format!("Feed version: {}\n", version));
    }
    if let Some(range) = date_range(report.feed_start_date, report.feed_end_date) {
        out.push_str(&format!("Feed dates: {}\n", range));
    }
    out.push('\n');

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Status", "Item", "Value"]);

    for (index, stat) in report.stats.iter().enumerate() {
        table.add_row(vec![status_cell(stat), item_cell(index, stat), stat.value.clone()]);
    }

    out.push_str(&format!("{}\n", table));

    let failed = report.failures().count();
    let summary = format!("{} of {} checks passed", report.stats.len() - failed, report.stats.len());
    if failed == 0 {
        out.push_str(&format!("{}\n", summary.green()));
    } else {
        out.push_str(&format!("{}\n", summary.yellow()));
    }

    out
}

fn status_cell(stat: &ValidationStat) -> String {
    if stat.passed() {
        format!("{}", "✅ Pass".green())
    } else {
        format!("{}", "❌ Fail".red())
    }
}

fn item_cell(index: usize, stat: &ValidationStat) -> String {
    let mut cell = stat.name.clone();

    let labels: Vec<&str> = stat
        .routes
        .iter()
        .flatten()
        .filter_map(|route| route.label())
        .collect();
    if !labels.is_empty() {
        cell.push_str(&format!("\nRoutes: {}", labels.join(", ")));
    }

    cell.push_str(&format!("\n#issue-{}", index));
    cell
}

/// Render `YYYYMMDD` dates as ISO dates, keeping anything unparseable as-is
fn format_feed_date(raw: u64) -> String {
    NaiveDate::parse_from_str(&raw.to_string(), "%Y%m%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn date_range(start: Option<u64>, end: Option<u64>) -> Option<String> {
    match (start, end) {
        (Some(start), Some(end)) => Some(format!(
            "{} to {}",
            format_feed_date(start),
            format_feed_date(end)
        )),
        (Some(start), None) => Some(format!("from {}", format_feed_date(start))),
        (None, Some(end)) => Some(format!("until {}", format_feed_date(end))),
        (None, None) => None,
    }
}
