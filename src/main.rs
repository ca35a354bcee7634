//! SalesPulse - sales performance dashboard backend
//!
//! Loads a CRM snapshot from JSON files once at startup and serves
//! revenue, pipeline, risk and recommendation views over HTTP.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Startup error (bad arguments, config, or data files)

mod analysis;
mod api;
mod cli;
mod config;
mod data;
mod models;
mod report;

use anyhow::{Context, Result};
use api::AppState;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use data::Dataset;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("SalesPulse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Startup failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .salespulse.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to change the data directory, reporting period and risk thresholds.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load config and data, then either write a report or serve.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let context = config.reporting_context()?;
    info!(
        "Reporting quarter {}, anchor date {}",
        context.clock.quarter, context.clock.anchor_date
    );

    let data = Dataset::load(&config.data.dir)
        .with_context(|| format!("Failed to load data from {}", config.data.dir.display()))?;

    if args.report {
        return write_briefing(&args, &data, &context);
    }

    let state = Arc::new(AppState {
        data: Arc::new(data),
        context,
    });
    api::serve(state, &config.server).await
}

/// Handle --report: compute every view once and write it out.
fn write_briefing(args: &Args, data: &Dataset, context: &analysis::ReportingContext) -> Result<()> {
    let snapshot =
        analysis::compute_snapshot(data, context).context("Failed to compute dashboard views")?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&snapshot)?,
        OutputFormat::Markdown => report::generate_markdown_report(&snapshot),
    };

    match args.output {
        Some(ref path) => {
            report::write_report(&output, path)?;
            if !args.quiet {
                println!("✅ Briefing saved to: {}", path.display());
            }
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
