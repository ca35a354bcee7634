//! Quarter revenue against target and the trailing monthly trend.

use super::calendar::{record_timestamp, Quarter, YearMonth};
use super::{AnalysisError, ReportingContext};
use crate::data::Dataset;
use crate::models::{Deal, Summary, Target};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Number of months in the trend chart.
pub const TREND_MONTHS: u32 = 6;

/// A closed-won deal with its parsed close timestamp.
struct WonDeal<'a> {
    deal: &'a Deal,
    closed_at: NaiveDateTime,
}

fn won_deals(data: &Dataset) -> Result<Vec<WonDeal<'_>>, AnalysisError> {
    data.deals
        .iter()
        .filter(|d| d.is_won())
        .map(|deal| {
            let raw = deal.closed_at.as_deref().unwrap_or_default();
            let closed_at = record_timestamp("deal", &deal.deal_id, raw)?;
            Ok(WonDeal { deal, closed_at })
        })
        .collect()
}

/// Sum of closed-won amounts that closed inside `quarter`.
fn quarter_revenue(won: &[WonDeal<'_>], quarter: Quarter) -> f64 {
    won.iter()
        .filter(|w| quarter.contains(w.closed_at))
        .map(|w| w.deal.amount_or_zero())
        .sum()
}

/// Target table keyed by month.
fn targets_by_month(targets: &[Target]) -> Result<HashMap<YearMonth, f64>, AnalysisError> {
    let mut by_month = HashMap::new();
    for target in targets {
        let month: YearMonth = target.month.parse()?;
        *by_month.entry(month).or_insert(0.0) += target.target;
    }
    Ok(by_month)
}

/// Target for a quarter: the same three months one year earlier.
///
/// A zero sum, including no matching rows, yields `fallback`.
fn quarter_target(targets: &HashMap<YearMonth, f64>, quarter: Quarter, fallback: f64) -> f64 {
    let total: f64 = quarter
        .months()
        .iter()
        .filter_map(|m| targets.get(&m.previous_year()))
        .sum();

    if total != 0.0 {
        total
    } else {
        fallback
    }
}

/// Percentage difference of `value` from `base`, 0 when `base` is not positive.
pub(crate) fn percent_change(value: f64, base: f64) -> f64 {
    if base > 0.0 {
        (value - base) / base * 100.0
    } else {
        0.0
    }
}

/// Monthly trend ending at `end`: labels, revenue and targets.
fn trend(
    won: &[WonDeal<'_>],
    targets: &HashMap<YearMonth, f64>,
    end: YearMonth,
) -> (Vec<String>, Vec<f64>, Vec<f64>) {
    let mut revenue_by_month: HashMap<YearMonth, f64> = HashMap::new();
    for w in won {
        *revenue_by_month
            .entry(YearMonth::of(w.closed_at))
            .or_insert(0.0) += w.deal.amount_or_zero();
    }

    let mut labels = Vec::with_capacity(TREND_MONTHS as usize);
    let mut revenue = Vec::with_capacity(TREND_MONTHS as usize);
    let mut target = Vec::with_capacity(TREND_MONTHS as usize);

    for back in (0..TREND_MONTHS).rev() {
        let month = end.months_back(back);
        labels.push(month.label().to_string());
        revenue.push(revenue_by_month.get(&month).copied().unwrap_or(0.0));
        target.push(
            targets
                .get(&month)
                .or_else(|| targets.get(&month.previous_year()))
                .copied()
                .unwrap_or(0.0),
        );
    }

    (labels, revenue, target)
}

/// Compute the revenue summary for the reporting quarter.
pub fn compute_summary(data: &Dataset, ctx: &ReportingContext) -> Result<Summary, AnalysisError> {
    let quarter = ctx.clock.quarter;
    let won = won_deals(data)?;
    let targets = targets_by_month(&data.targets)?;

    let current = quarter_revenue(&won, quarter);
    let previous = quarter_revenue(&won, quarter.previous());
    let target = quarter_target(&targets, quarter, ctx.fallback_target);
    let (trend_months, trend_revenue, trend_target) = trend(&won, &targets, ctx.clock.trend_end);

    Ok(Summary {
        current_quarter_revenue: current,
        target,
        gap_percent: percent_change(current, target),
        change_percent: percent_change(current, previous),
        change_label: "QoQ".to_string(),
        trend_months,
        trend_revenue,
        trend_target,
    })
}
