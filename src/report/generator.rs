//! Markdown and JSON briefing generation.
//!
//! Renders a [`DashboardSnapshot`] as a standalone document, for sharing
//! the dashboard numbers without running the server.

use crate::models::{DashboardSnapshot, DeltaSource, Drivers, RiskFactors, Summary};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown briefing.
pub fn generate_markdown_report(snapshot: &DashboardSnapshot) -> String {
    let mut output = String::new();

    output.push_str("# Sales Performance Briefing\n\n");
    output.push_str(&format!(
        "*Quarter {} | Anchor date {}*\n\n",
        snapshot.quarter, snapshot.anchor_date
    ));

    output.push_str(&generate_summary_section(&snapshot.summary));
    output.push_str(&generate_trend_section(&snapshot.summary));
    output.push_str(&generate_drivers_section(&snapshot.drivers));
    output.push_str(&generate_risk_section(&snapshot.risk_factors));
    output.push_str(&generate_recommendations_section(&snapshot.recommendations));

    output
}

/// Whole-number money with thousands separators, e.g. `$1,234,567`.
fn format_money(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

fn format_signed(value: f64, unit: &str) -> String {
    if value >= 0.0 {
        format!("+{:.1}{}", value, unit)
    } else {
        format!("{:.1}{}", value, unit)
    }
}

fn generate_summary_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Revenue | Target | Gap | Change |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} {} |\n\n",
        format_money(summary.current_quarter_revenue),
        format_money(summary.target),
        format_signed(summary.gap_percent, "%"),
        format_signed(summary.change_percent, "%"),
        summary.change_label
    ));

    section
}

fn generate_trend_section(summary: &Summary) -> String {
    let mut section = String::new();

    section.push_str("## Revenue Trend\n\n");
    section.push_str("| Month | Revenue | Target |\n");
    section.push_str("|:---|---:|---:|\n");

    let rows = summary
        .trend_months
        .iter()
        .zip(&summary.trend_revenue)
        .zip(&summary.trend_target);
    for ((month, revenue), target) in rows {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            month,
            format_money(*revenue),
            format_money(*target)
        ));
    }
    section.push('\n');

    section
}

fn generate_drivers_section(drivers: &Drivers) -> String {
    let mut section = String::new();

    section.push_str("## Revenue Drivers\n\n");
    section.push_str("| Metric | Value | Change |\n");
    section.push_str("|:---|---:|---:|\n");
    section.push_str(&format!(
        "| Pipeline Value | {} | {} |\n",
        format_money(drivers.pipeline_value),
        format_signed(drivers.pipeline_change_percent, "%")
    ));
    section.push_str(&format!(
        "| Win Rate | {:.1}% | {} |\n",
        drivers.win_rate,
        format_signed(drivers.win_rate_change_percent, "%")
    ));
    section.push_str(&format!(
        "| Avg Deal Size | {} | {} |\n",
        format_money(drivers.avg_deal_size),
        format_signed(drivers.avg_deal_size_change_percent, "%")
    ));
    section.push_str(&format!(
        "| Sales Cycle | {} days | {} |\n\n",
        drivers.sales_cycle_days,
        format_signed(drivers.sales_cycle_change_days, " days")
    ));
    match drivers.delta_source {
        DeltaSource::Placeholder => section.push_str(
            "*Change figures are placeholder values, not measured against a prior period.*\n\n",
        ),
    }

    section
}

fn generate_risk_section(risks: &RiskFactors) -> String {
    let mut section = String::new();
    let mut items = Vec::new();

    for stale in &risks.stale_deals {
        items.push(stale.detail.clone());
    }
    for rep in &risks.underperforming_reps {
        items.push(format!("Rep {} - {}: {}", rep.rep_name, rep.metric, rep.value));
    }
    if risks.low_activity_count() > 0 {
        items.extend(risks.low_activity_accounts.iter().map(|a| a.detail.clone()));
    }

    section.push_str("## Top Risk Factors\n\n");
    if items.is_empty() {
        section.push_str("No major risk factors identified.\n\n");
        return section;
    }

    for item in items {
        section.push_str(&format!("- {}\n", item));
    }
    section.push('\n');

    section
}

fn generate_recommendations_section(recommendations: &[String]) -> String {
    let mut section = String::new();

    section.push_str("## Recommendations\n\n");
    for (i, rec) in recommendations.iter().enumerate() {
        section.push_str(&format!("{}. {}\n", i + 1, rec));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(snapshot: &DashboardSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
