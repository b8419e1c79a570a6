// src/export.rs
// =============================================================================
// Getting the results out of the program.
//
// Two sinks:
// - a CSV file in the output directory (always, unless --no-export)
// - stdout, either as a human-readable table or as JSON (--json)
//
// CSV layout:
//
//   Date,Error Code,Keyword,URL
//   2026-01-01 10:00:00,,admin,https://example.com
//   2026-01-01 10:00:02,request timed out,,https://slow.com
//
//   Visited URLs:
//   https://example.com
// =============================================================================

use crate::crawl::CrawlOutcome;
use crate::ledger::ResultRecord;
use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes records and visited URLs as CSV into any writer
pub fn write_csv<W: Write>(writer: W, records: &[ResultRecord], visited: &[String]) -> Result<()> {
    // Rows have different lengths (4 columns, then 0, then 1), so be flexible
    let mut csv_writer = csv_builder().from_writer(writer);

    csv_writer.write_record(["Date", "Error Code", "Keyword", "URL"])?;
    for record in records {
        csv_writer.write_record([
            record.formatted_timestamp().as_str(),
            record.error_text(),
            record.keyword(),
            record.url.as_str(),
        ])?;
    }

    // csv refuses to write a zero-field record, so the blank separator row
    // goes straight to the underlying writer
    csv_writer.flush()?;
    let mut inner = csv_writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("could not finish CSV rows: {}", e.error()))?;
    writeln!(inner)?;

    let mut csv_writer = csv_builder().from_writer(inner);
    csv_writer.write_record(["Visited URLs:"])?;
    for url in visited {
        csv_writer.write_record([url.as_str()])?;
    }
    csv_writer.flush()?;

    Ok(())
}

fn csv_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.flexible(true).terminator(csv::Terminator::Any(b'\n'));
    builder
}

/// Saves the outcome of a walk to `<dir>/crawler_output_<timestamp>.csv`.
///
/// The directory is created if it doesn't exist yet.
/// Returns the path of the written file.
pub fn export_csv(dir: &Path, outcome: CrawlOutcome) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("could not create results directory {}", dir.display()))?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = dir.join(format!("crawler_output_{}.csv", timestamp));

    let file = fs::File::create(&path).with_context(|| format!("could not create {}", path.display()))?;
    let visited = outcome.visited.into_sorted_vec();
    write_csv(file, &outcome.records, &visited)
        .with_context(|| format!("could not write {}", path.display()))?;

    Ok(path)
}

// Prints the results either as a table or JSON
pub fn print_results(outcome: &CrawlOutcome, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(&outcome.records)?;
        println!("{}", json_output);
    } else {
        print_table(outcome);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(outcome: &CrawlOutcome) {
    println!("{:<20} {:<20} {:<50}", "DATE", "FOUND", "URL");
    println!("{}", "=".repeat(90));

    for record in &outcome.records {
        let found = if record.is_error() {
            format!("❌ {}", record.error_text())
        } else {
            format!("🔑 {}", record.keyword())
        };

        println!(
            "{:<20} {:<20} {:<50}",
            record.formatted_timestamp(),
            truncate(&found, 20),
            truncate(&record.url, 50)
        );
    }

    println!();

    let errors = outcome.error_count();
    println!("📊 Summary:");
    println!("   🌐 Pages visited: {}", outcome.visited.len());
    println!("   🔑 Keyword matches: {}", outcome.records.len() - errors);
    println!("   ❌ Errors: {}", errors);
    if outcome.cancelled {
        println!("   ⏹️  Walk was stopped before it finished");
    } else if outcome.visited.is_empty() {
        println!("   ⚠️  No page could be walked from the seed URL");
    }
}

// Shortens text for display, respecting char boundaries
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
