// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Most flags are optional overrides: anything not given on the command line
// comes from the --config file, or from the built-in defaults.
// =============================================================================

use crate::config::WalkerConfig;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "web-walker",
    version = "0.1.0",
    about = "Walks a website from a starting URL and records where keywords appear",
    long_about = "web-walker follows links depth-first from a starting URL, scans every page \
                  for the given keywords and saves the matches (and any errors) to a CSV file. \
                  Press Ctrl-C to stop the walk early; results found so far are still saved."
)]
pub struct Cli {
    /// Starting URL (e.g., https://example.com)
    ///
    /// This is a positional argument (required, no flag needed)
    pub seed_url: String,

    /// Keywords to look for, comma-separated (e.g., "login, admin")
    ///
    /// Matching is case-sensitive and looks at the raw page content
    #[arg(short, long, default_value = "")]
    pub keywords: String,

    /// JSON config file with walker settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the CSV results are saved into
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only walk hosts ending with this suffix ("" allows every host)
    #[arg(long)]
    pub host_suffix: Option<String>,

    /// Shortest pause after each page, in milliseconds
    #[arg(long)]
    pub min_delay_ms: Option<u64>,

    /// Longest pause after each page, in milliseconds
    #[arg(long)]
    pub max_delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Check TLS certificates (off by default)
    #[arg(long)]
    pub verify_tls: bool,

    /// Also follow relative links like "/about"
    #[arg(long)]
    pub follow_relative: bool,

    /// Print results as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Don't write the CSV file
    #[arg(long)]
    pub no_export: bool,
}

impl Cli {
    /// Builds the effective config: file (or defaults) first, then flags on top
    pub fn load_config(&self) -> Result<WalkerConfig> {
        let mut config = match &self.config {
            Some(path) => WalkerConfig::from_file(path)?,
            None => WalkerConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate().context("invalid walker settings")?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut WalkerConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(suffix) = &self.host_suffix {
            config.host_suffix = suffix.clone();
        }
        if let Some(ms) = self.min_delay_ms {
            config.min_delay_ms = ms;
        }
        if let Some(ms) = self.max_delay_ms {
            config.max_delay_ms = ms;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        // Boolean flags can only switch things on
        config.verify_tls |= self.verify_tls;
        config.follow_relative |= self.follow_relative;
    }
}
