//! Aggregation engine.
//!
//! Every view is a pure function of the loaded [`Dataset`] and a
//! [`ReportingContext`]; nothing here touches the wall clock or any
//! process-wide state.

pub mod calendar;
pub mod drivers;
pub mod recommendations;
pub mod revenue;
pub mod risk;

pub use calendar::{Quarter, ReportingClock, YearMonth};
pub use drivers::compute_drivers;
pub use recommendations::compute_recommendations;
pub use revenue::compute_summary;
pub use risk::{compute_risk_factors, RiskThresholds};

use crate::data::Dataset;
use crate::models::DashboardSnapshot;
use std::collections::HashMap;
use std::hash::Hash;
use thiserror::Error;

/// Quarter target used when the target table has nothing for the quarter.
pub const DEFAULT_FALLBACK_TARGET: f64 = 600_000.0;

/// Failure while computing a view.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid timestamp '{value}' on {entity} {id}")]
    InvalidTimestamp {
        entity: &'static str,
        id: String,
        value: String,
    },

    #[error("invalid month key '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("invalid reporting period: {0}")]
    InvalidPeriod(String),
}

/// Everything a computation needs besides the data itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportingContext {
    pub clock: ReportingClock,
    pub thresholds: RiskThresholds,
    /// Quarter target when no target rows match.
    pub fallback_target: f64,
}

impl Default for ReportingContext {
    fn default() -> Self {
        Self {
            clock: ReportingClock::default(),
            thresholds: RiskThresholds::default(),
            fallback_target: DEFAULT_FALLBACK_TARGET,
        }
    }
}

/// Compute all four views in one pass over the same snapshot.
pub fn compute_snapshot(
    data: &Dataset,
    ctx: &ReportingContext,
) -> Result<DashboardSnapshot, AnalysisError> {
    let risk_factors = compute_risk_factors(data, ctx)?;
    let recommendations = recommendations::recommend(&risk_factors);

    Ok(DashboardSnapshot {
        anchor_date: ctx.clock.anchor_date.format("%Y-%m-%d").to_string(),
        quarter: ctx.clock.quarter.to_string(),
        summary: compute_summary(data, ctx)?,
        drivers: compute_drivers(data, ctx)?,
        risk_factors,
        recommendations,
    })
}

/// Counter that remembers the order keys were first seen in.
#[derive(Debug, Clone)]
pub(crate) struct Tally<K> {
    order: Vec<K>,
    counts: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            counts: HashMap::new(),
        }
    }

    pub fn add(&mut self, key: K) {
        match self.counts.get_mut(&key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.clone());
                self.counts.insert(key, 1);
            }
        }
    }

    pub fn get(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> + '_ {
        self.order.iter().map(move |k| (k, self.get(k)))
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_tally_keeps_first_seen_order() {
        let mut tally = Tally::new();
        for key in ["SMB", "Enterprise", "SMB", "Mid-Market", "Enterprise", "SMB"] {
            tally.add(key);
        }

        let entries: Vec<(&str, usize)> = tally.iter().map(|(k, c)| (*k, c)).collect();
        assert_eq!(entries, vec![("SMB", 3), ("Enterprise", 2), ("Mid-Market", 1)]);
        assert_eq!(tally.total(), 6);
        assert_eq!(tally.get(&"Unknown"), 0);
    }

    #[test]
    fn test_snapshot_on_empty_dataset() {
        let snapshot = compute_snapshot(&Dataset::default(), &ReportingContext::default()).unwrap();

        assert_eq!(snapshot.anchor_date, "2026-02-03");
        assert_eq!(snapshot.quarter, "2026-Q1");
        assert_eq!(snapshot.summary.current_quarter_revenue, 0.0);
        assert_eq!(snapshot.summary.target, DEFAULT_FALLBACK_TARGET);
        assert_eq!(snapshot.summary.gap_percent, -100.0);
        assert_eq!(snapshot.drivers.win_rate, 0.0);
        assert!(snapshot.risk_factors.stale_deals.is_empty());
        assert_eq!(snapshot.recommendations.len(), 3);
    }

    #[test]
    fn test_snapshot_propagates_bad_timestamp() {
        let data = dataset(vec![won("D1", 100.0, "2025-10-01", "someday")]);
        let err = compute_snapshot(&data, &ReportingContext::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidTimestamp { .. }));
    }
}
