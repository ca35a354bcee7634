//! Risk heuristics: stale deals, underperforming reps, quiet accounts.

use super::calendar::{days_between, record_timestamp};
use super::{AnalysisError, ReportingContext, Tally};
use crate::data::Dataset;
use crate::models::{
    DealStage, LowActivityFinding, RiskFactors, StaleDealFinding, UnderperformingRep,
};
use chrono::Duration;
use std::collections::{HashMap, HashSet};

/// Segment used when a deal's account or its segment is missing.
pub const UNKNOWN_SEGMENT: &str = "Unknown";

/// Tunable limits for the risk heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskThresholds {
    /// An open deal older than this many days is stale.
    pub stale_after_days: i64,
    /// Accounts without activity in this many days are quiet.
    pub inactive_after_days: i64,
    /// Minimum closed deals before a rep's win rate is judged.
    pub min_closed_deals: usize,
    /// Win rate (percent) below which a rep is flagged.
    pub underperforming_win_rate: f64,
    /// Maximum number of reps reported.
    pub max_reps: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            stale_after_days: 30,
            inactive_after_days: 30,
            min_closed_deals: 5,
            underperforming_win_rate: 15.0,
            max_reps: 5,
        }
    }
}

/// Open deals older than the threshold, grouped by account segment.
fn stale_deals(
    data: &Dataset,
    ctx: &ReportingContext,
) -> Result<Vec<StaleDealFinding>, AnalysisError> {
    let anchor = ctx.clock.anchor();
    let threshold = ctx.thresholds.stale_after_days;
    let segments: HashMap<&str, Option<&str>> = data
        .accounts
        .iter()
        .map(|a| (a.account_id.as_str(), a.segment.as_deref()))
        .collect();

    let mut by_segment = Tally::new();

    for deal in data.deals.iter().filter(|d| d.stage.is_open()) {
        let created = record_timestamp("deal", &deal.deal_id, &deal.created_at)?;
        if days_between(created, anchor) <= threshold as f64 {
            continue;
        }

        let segment = segments
            .get(deal.account_id.as_str())
            .copied()
            .flatten()
            .unwrap_or(UNKNOWN_SEGMENT);
        by_segment.add(segment);
    }

    let mut findings: Vec<StaleDealFinding> = by_segment
        .iter()
        .map(|(segment, count)| StaleDealFinding {
            count,
            segment: Some(segment.to_string()),
            detail: format!("{} {} deals stuck over {} days", count, segment, threshold),
        })
        .collect();

    // Every stale deal lands in a segment group, "Unknown" included, so
    // this only fires if that grouping is ever narrowed.
    let total = by_segment.total();
    if findings.is_empty() && total > 0 {
        findings.push(StaleDealFinding {
            count: total,
            segment: None,
            detail: format!("{} deals stuck over {} days", total, threshold),
        });
    }

    Ok(findings)
}

/// Reps with enough closed deals and a win rate under the threshold.
///
/// Reps are visited in the order of their first win. Reps without any win
/// are never reported.
fn underperforming_reps(data: &Dataset, ctx: &ReportingContext) -> Vec<UnderperformingRep> {
    let thresholds = &ctx.thresholds;
    let names: HashMap<&str, &str> = data
        .reps
        .iter()
        .map(|r| (r.rep_id.as_str(), r.name.as_str()))
        .collect();

    let mut wins = Tally::new();
    let mut losses = Tally::new();
    for deal in &data.deals {
        match deal.stage {
            DealStage::ClosedWon => wins.add(deal.rep_id.as_str()),
            DealStage::ClosedLost => losses.add(deal.rep_id.as_str()),
            _ => {}
        }
    }

    let mut flagged = Vec::new();
    for (&rep_id, won) in wins.iter() {
        let closed = won + losses.get(&rep_id);
        if closed < thresholds.min_closed_deals {
            continue;
        }

        let rate = won as f64 / closed as f64 * 100.0;
        if rate < thresholds.underperforming_win_rate {
            flagged.push(UnderperformingRep {
                rep_name: names.get(rep_id).unwrap_or(&rep_id).to_string(),
                rep_id: rep_id.to_string(),
                metric: "Win Rate".to_string(),
                value: format!("{}%", rate.round()),
            });
        }
    }

    flagged.truncate(thresholds.max_reps);
    flagged
}

/// Accounts with at least one deal but no activity inside the window.
fn low_activity_accounts(
    data: &Dataset,
    ctx: &ReportingContext,
) -> Result<LowActivityFinding, AnalysisError> {
    let days = ctx.thresholds.inactive_after_days;
    let cutoff = Duration::try_days(days)
        .and_then(|window| ctx.clock.anchor().checked_sub_signed(window))
        .ok_or_else(|| {
            AnalysisError::InvalidPeriod(format!(
                "inactivity window of {} days reaches outside the calendar",
                days
            ))
        })?;
    let deal_accounts: HashMap<&str, &str> = data
        .deals
        .iter()
        .map(|d| (d.deal_id.as_str(), d.account_id.as_str()))
        .collect();

    let mut active: HashSet<&str> = HashSet::new();
    for activity in &data.activities {
        let at = record_timestamp("activity", &activity.activity_id, &activity.timestamp)?;
        if at < cutoff {
            continue;
        }
        if let Some(&account) = deal_accounts.get(activity.deal_id.as_str()) {
            active.insert(account);
        }
    }

    let with_deals: HashSet<&str> = data.deals.iter().map(|d| d.account_id.as_str()).collect();
    let count = with_deals.difference(&active).count();

    Ok(LowActivityFinding {
        count,
        detail: format!("{} Accounts with no recent activity", count),
    })
}

/// Compute all three risk heuristics against the anchor date.
pub fn compute_risk_factors(
    data: &Dataset,
    ctx: &ReportingContext,
) -> Result<RiskFactors, AnalysisError> {
    Ok(RiskFactors {
        stale_deals: stale_deals(data, ctx)?,
        underperforming_reps: underperforming_reps(data, ctx),
        low_activity_accounts: vec![low_activity_accounts(data, ctx)?],
    })
}
