//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.salespulse.toml` files.

use crate::analysis::{Quarter, ReportingClock, ReportingContext, RiskThresholds, YearMonth};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".salespulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Data location.
    #[serde(default)]
    pub data: DataConfig,

    /// Reporting period and anchor date.
    #[serde(default)]
    pub reporting: ReportingConfig,

    /// Risk heuristic thresholds.
    #[serde(default)]
    pub risk: RiskConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from the dashboard dev server.
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: true,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_true() -> bool {
    true
}

/// Where the record collections live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the five JSON files.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Reporting period. Nothing reads the wall clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Reference date (`YYYY-MM-DD`) for stale and inactivity checks.
    #[serde(default = "default_anchor_date")]
    pub anchor_date: String,

    /// Year of the reported quarter.
    #[serde(default = "default_current_year")]
    pub current_year: i32,

    /// Reported quarter, 1 to 4.
    #[serde(default = "default_current_quarter")]
    pub current_quarter: u32,

    /// Last month (`YYYY-MM`) of the six-month trend.
    #[serde(default = "default_trend_end_month")]
    pub trend_end_month: String,

    /// Quarter target when the target table has no matching rows.
    #[serde(default = "default_fallback_target")]
    pub fallback_target: f64,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            anchor_date: default_anchor_date(),
            current_year: default_current_year(),
            current_quarter: default_current_quarter(),
            trend_end_month: default_trend_end_month(),
            fallback_target: default_fallback_target(),
        }
    }
}

fn default_anchor_date() -> String {
    "2026-02-03".to_string()
}

fn default_current_year() -> i32 {
    2026
}

fn default_current_quarter() -> u32 {
    1
}

fn default_trend_end_month() -> String {
    "2026-01".to_string()
}

fn default_fallback_target() -> f64 {
    crate::analysis::DEFAULT_FALLBACK_TARGET
}

/// Risk heuristic thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_thirty")]
    pub stale_after_days: i64,

    #[serde(default = "default_thirty")]
    pub inactive_after_days: i64,

    #[serde(default = "default_min_closed_deals")]
    pub min_closed_deals: usize,

    /// Win rate in percent.
    #[serde(default = "default_underperforming_win_rate")]
    pub underperforming_win_rate: f64,

    #[serde(default = "default_max_reps")]
    pub max_reps: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stale_after_days: default_thirty(),
            inactive_after_days: default_thirty(),
            min_closed_deals: default_min_closed_deals(),
            underperforming_win_rate: default_underperforming_win_rate(),
            max_reps: default_max_reps(),
        }
    }
}

fn default_thirty() -> i64 {
    30
}

fn default_min_closed_deals() -> usize {
    5
}

fn default_underperforming_win_rate() -> f64 {
    15.0
}

fn default_max_reps() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.data_dir {
            self.data.dir = dir.clone();
        }
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref anchor) = args.anchor_date {
            self.reporting.anchor_date = anchor.clone();
        }
        if args.no_cors {
            self.server.cors = false;
        }
    }

    /// Build the analysis context, validating the reporting section.
    pub fn reporting_context(&self) -> Result<ReportingContext> {
        let reporting = &self.reporting;

        let anchor_date = NaiveDate::parse_from_str(&reporting.anchor_date, "%Y-%m-%d")
            .with_context(|| {
                format!(
                    "reporting.anchor_date must be YYYY-MM-DD, got '{}'",
                    reporting.anchor_date
                )
            })?;
        let quarter = Quarter::new(reporting.current_year, reporting.current_quarter)?;
        let trend_end: YearMonth = reporting
            .trend_end_month
            .parse()
            .context("reporting.trend_end_month")?;

        if !(reporting.fallback_target > 0.0) {
            bail!("reporting.fallback_target must be positive");
        }
        if self.risk.stale_after_days < 0 || self.risk.inactive_after_days < 0 {
            bail!("risk day thresholds must not be negative");
        }
        if !(0.0..=100.0).contains(&self.risk.underperforming_win_rate) {
            bail!("risk.underperforming_win_rate must be between 0 and 100");
        }

        Ok(ReportingContext {
            clock: ReportingClock {
                anchor_date,
                quarter,
                trend_end,
            },
            thresholds: RiskThresholds {
                stale_after_days: self.risk.stale_after_days,
                inactive_after_days: self.risk.inactive_after_days,
                min_closed_deals: self.risk.min_closed_deals,
                underperforming_win_rate: self.risk.underperforming_win_rate,
                max_reps: self.risk.max_reps,
            },
            fallback_target: reporting.fallback_target,
        })
    }

    /// Validate the server section.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be non-zero");
        }
        if self.server.host.trim().is_empty() {
            bail!("server.host must not be empty");
        }
        self.reporting_context().map(|_| ())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.data.dir, PathBuf::from("data"));
        assert_eq!(config.reporting.anchor_date, "2026-02-03");
        assert!(config.server.cors);
    }

    #[test]
    fn test_default_context_matches_analysis_defaults() {
        let ctx = Config::default().reporting_context().unwrap();
        assert_eq!(ctx, ReportingContext::default());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
port = 8080
cors = false

[data]
dir = "/srv/crm"

[reporting]
anchor_date = "2026-05-10"
current_quarter = 2
trend_end_month = "2026-04"

[risk]
stale_after_days = 45
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.server.cors);
        assert_eq!(config.data.dir, PathBuf::from("/srv/crm"));

        let ctx = config.reporting_context().unwrap();
        assert_eq!(ctx.clock.quarter, Quarter::new(2026, 2).unwrap());
        assert_eq!(ctx.clock.trend_end.to_string(), "2026-04");
        assert_eq!(ctx.thresholds.stale_after_days, 45);
        assert_eq!(ctx.thresholds.inactive_after_days, 30);
    }

    #[test]
    fn test_invalid_reporting_section() {
        let mut config = Config::default();
        config.reporting.current_quarter = 5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.reporting.anchor_date = "03/02/2026".to_string();
        assert!(config.reporting_context().is_err());

        let mut config = Config::default();
        config.reporting.trend_end_month = "2026-1".to_string();
        assert!(config.reporting_context().is_err());

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[reporting]"));
        assert!(toml_str.contains("[risk]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.reporting.trend_end_month, "2026-01");
    }
}
