//! Pipeline health metrics.

use super::calendar::{days_between, record_timestamp};
use super::{AnalysisError, ReportingContext};
use crate::data::Dataset;
use crate::models::{DealStage, DeltaSource, Drivers};

/// Period-over-period deltas reported next to each driver metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodDeltas {
    pub pipeline_percent: f64,
    pub win_rate_percent: f64,
    pub avg_deal_size_percent: f64,
    pub sales_cycle_days: f64,
    pub source: DeltaSource,
}

/// No comparison period exists yet, so the deltas are fixed values.
pub const PLACEHOLDER_DELTAS: PeriodDeltas = PeriodDeltas {
    pipeline_percent: 12.0,
    win_rate_percent: -4.0,
    avg_deal_size_percent: 3.0,
    sales_cycle_days: 9.0,
    source: DeltaSource::Placeholder,
};

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Compute pipeline value, win rate, average deal size and sales cycle.
///
/// `_ctx` is unused for now: none of the driver metrics are relative to the
/// anchor date.
pub fn compute_drivers(data: &Dataset, _ctx: &ReportingContext) -> Result<Drivers, AnalysisError> {
    let pipeline_value: f64 = data
        .deals
        .iter()
        .filter(|d| d.stage.is_open())
        .map(|d| d.amount_or_zero())
        .sum();

    let won: Vec<_> = data.deals.iter().filter(|d| d.is_won()).collect();
    let lost = data
        .deals
        .iter()
        .filter(|d| d.stage == DealStage::ClosedLost)
        .count();

    let closed = won.len() + lost;
    let win_rate = if closed > 0 {
        won.len() as f64 / closed as f64 * 100.0
    } else {
        0.0
    };

    let amounts: Vec<f64> = won
        .iter()
        .filter_map(|d| d.amount)
        .filter(|a| *a > 0.0)
        .collect();

    let mut cycles = Vec::with_capacity(won.len());
    for deal in &won {
        if let Some(closed_at) = deal.closed_at.as_deref() {
            let created = record_timestamp("deal", &deal.deal_id, &deal.created_at)?;
            let closed = record_timestamp("deal", &deal.deal_id, closed_at)?;
            cycles.push(days_between(created, closed));
        }
    }

    let deltas = PLACEHOLDER_DELTAS;

    Ok(Drivers {
        pipeline_value,
        pipeline_change_percent: deltas.pipeline_percent,
        win_rate,
        win_rate_change_percent: deltas.win_rate_percent,
        avg_deal_size: mean(&amounts),
        avg_deal_size_change_percent: deltas.avg_deal_size_percent,
        sales_cycle_days: mean(&cycles).round() as i64,
        sales_cycle_change_days: deltas.sales_cycle_days,
        delta_source: deltas.source,
    })
}
