//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// SalesPulse - sales performance dashboard backend
///
/// Loads CRM records (accounts, reps, deals, activities, targets) from a
/// data directory and serves revenue, pipeline, risk and recommendation
/// views as JSON.
///
/// Examples:
///   salespulse
///   salespulse --data-dir ./data --port 8080
///   salespulse --anchor-date 2026-03-01
///   salespulse --report --format markdown --output briefing.md
///   salespulse --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding accounts.json, reps.json, deals.json,
    /// activities.json and targets.json
    #[arg(short, long, value_name = "DIR", env = "SALESPULSE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Interface to bind the HTTP server to
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// Reference date (YYYY-MM-DD) for stale-deal and inactivity checks
    #[arg(long, value_name = "DATE")]
    pub anchor_date: Option<String>,

    /// Disable cross-origin requests
    #[arg(long)]
    pub no_cors: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .salespulse.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Compute every view once, write a report and exit instead of serving
    #[arg(long)]
    pub report: bool,

    /// Report format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT", requires = "report")]
    pub format: OutputFormat,

    /// Report output file; stdout when omitted
    #[arg(short, long, value_name = "FILE", requires = "report")]
    pub output: Option<PathBuf>,

    /// Generate a default .salespulse.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(port) = self.port {
            if port == 0 {
                return Err("Port must be at least 1".to_string());
            }
        }

        if let Some(ref anchor) = self.anchor_date {
            if NaiveDate::parse_from_str(anchor, "%Y-%m-%d").is_err() {
                return Err(format!(
                    "Anchor date must be in YYYY-MM-DD form, got '{}'",
                    anchor
                ));
            }
        }

        if let Some(ref dir) = self.data_dir {
            if !dir.exists() {
                return Err(format!("Data directory does not exist: {}", dir.display()));
            }
            if !dir.is_dir() {
                return Err(format!("Data path is not a directory: {}", dir.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
