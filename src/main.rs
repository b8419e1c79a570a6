// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments and build the walker settings
// 2. Start a walk through the crawl controller
// 3. Show a live status line until the walk ends (or Ctrl-C stops it)
// 4. Print the results and save them to CSV
// 5. Exit with proper code (0 = clean walk, 1 = errors recorded, 2 = failure)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod export;
mod extract;
mod fetch;
mod ledger;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use crawl::{CrawlController, CrawlState, Crawler, Progress};
use extract::KeywordSet;
use fetch::HttpFetcher;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

// How often the status line is redrawn
const STATUS_TICK: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() {
    // RUST_LOG=debug shows skipped URLs and non-200 responses too
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = walk finished without error records
//   Ok(1) = some pages could not be fetched
//   Err = setup, start or export failed
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    let keywords = KeywordSet::parse(&cli.keywords);

    println!("🔍 Walking from: {}", cli.seed_url);
    if keywords.is_empty() {
        println!("⚠️  No keywords given, only errors will be recorded");
    } else {
        println!("🔑 Keywords: {}", keywords);
    }

    let fetcher = HttpFetcher::new(&config).context("could not build HTTP client")?;
    let crawler = Crawler::from_config(Arc::new(fetcher), &config);
    let mut controller = CrawlController::new(crawler);

    controller.start(&cli.seed_url, keywords)?;
    watch_walk(&controller).await;

    let outcome = controller
        .finish()
        .await
        .context("walk ended without handing back results")?;

    print_results_and_exit_code(outcome, &cli, &config.output_dir)
}

// Redraws the status line until the walk is over.
// The first Ctrl-C asks the walk to stop; it then winds down on its own.
async fn watch_walk(controller: &CrawlController) {
    let progress = controller.progress();
    let mut ticker = tokio::time::interval(STATUS_TICK);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut stopping = false;
    let mut periods = 0;

    while controller.state() != CrawlState::Idle {
        tokio::select! {
            _ = &mut ctrl_c, if !stopping => {
                controller.stop();
                stopping = true;
            }
            _ = ticker.tick() => {
                let line = status_line(&progress.borrow(), periods, stopping);
                eprint!("\r\x1b[2K{}", line);
                let _ = std::io::stderr().flush();
                periods = (periods + 1) % 4;
            }
        }
    }
    eprintln!();
}

fn status_line(progress: &Progress, periods: usize, stopping: bool) -> String {
    let status = if stopping {
        "Stopping".to_string()
    } else {
        format!("Walking{:<3}", ".".repeat(periods))
    };
    let current = progress.current_url.as_deref().unwrap_or("-");
    format!(
        "{} | {} visited, {} record(s) | Current Site: {}",
        status, progress.visited, progress.records, current
    )
}

fn print_results_and_exit_code(outcome: crawl::CrawlOutcome, cli: &Cli, output_dir: &std::path::Path) -> Result<i32> {
    export::print_results(&outcome, cli.json)?;

    let error_count = outcome.error_count();

    if !cli.no_export {
        let path = export::export_csv(output_dir, outcome)?;
        // Keep stdout clean for --json consumers
        eprintln!("💾 Data saved to CSV file: {}", path.display());
    }

    if error_count > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_animates() {
        let progress = Progress {
            current_url: Some("https://example.com".to_string()),
            visited: 3,
            records: 5,
        };
        assert_eq!(
            status_line(&progress, 2, false),
            "Walking..  | 3 visited, 5 record(s) | Current Site: https://example.com"
        );
        assert!(status_line(&Progress::default(), 0, true).starts_with("Stopping |"));
    }
}
