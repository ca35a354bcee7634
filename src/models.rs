//! Data models for the sales dashboard.
//!
//! This module contains the CRM records loaded from disk and the derived
//! views served to the dashboard. Records use the snake_case field names of
//! the source files; views use the camelCase names the dashboard expects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DealStage {
    Prospecting,
    Negotiation,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealStage::Prospecting => write!(f, "Prospecting"),
            DealStage::Negotiation => write!(f, "Negotiation"),
            DealStage::ClosedWon => write!(f, "Closed Won"),
            DealStage::ClosedLost => write!(f, "Closed Lost"),
        }
    }
}

impl DealStage {
    /// Returns true for stages that still count towards the pipeline.
    pub fn is_open(self) -> bool {
        matches!(self, DealStage::Prospecting | DealStage::Negotiation)
    }
}

/// A customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    /// Market segment, used to group stale deals.
    #[serde(default)]
    pub segment: Option<String>,
}

/// A sales representative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rep {
    pub rep_id: String,
    pub name: String,
}

/// A single opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub deal_id: String,
    pub account_id: String,
    pub rep_id: String,
    /// Monetary amount; absent amounts count as zero.
    #[serde(default)]
    pub amount: Option<f64>,
    pub stage: DealStage,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 close timestamp, only set on closed deals.
    #[serde(default)]
    pub closed_at: Option<String>,
}

impl Deal {
    /// Amount with missing values treated as zero.
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }

    /// True for a won deal that carries a close timestamp.
    pub fn is_won(&self) -> bool {
        self.stage == DealStage::ClosedWon && self.closed_at.is_some()
    }
}

/// A logged touchpoint (call, email, meeting) on a deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub activity_id: String,
    pub deal_id: String,
    pub timestamp: String,
}

/// Monthly revenue target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Month key in `YYYY-MM` form.
    pub month: String,
    pub target: f64,
}

/// Quarter revenue against target, plus the six-month trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub current_quarter_revenue: f64,
    pub target: f64,
    pub gap_percent: f64,
    pub change_percent: f64,
    pub change_label: String,
    pub trend_months: Vec<String>,
    pub trend_revenue: Vec<f64>,
    pub trend_target: Vec<f64>,
}

/// Where the period-over-period deltas of [`Drivers`] come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaSource {
    /// Fixed values, not derived from a comparison period.
    Placeholder,
}

/// Pipeline health metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drivers {
    pub pipeline_value: f64,
    pub pipeline_change_percent: f64,
    pub win_rate: f64,
    pub win_rate_change_percent: f64,
    pub avg_deal_size: f64,
    pub avg_deal_size_change_percent: f64,
    pub sales_cycle_days: i64,
    pub sales_cycle_change_days: f64,
    pub delta_source: DeltaSource,
}

/// Open deals that have been sitting too long, optionally per segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleDealFinding {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    pub detail: String,
}

/// A rep whose win rate falls below the coaching threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderperformingRep {
    pub rep_name: String,
    pub rep_id: String,
    pub metric: String,
    pub value: String,
}

/// Accounts with deals but no recent activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowActivityFinding {
    pub count: usize,
    pub detail: String,
}

/// The three risk heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactors {
    pub stale_deals: Vec<StaleDealFinding>,
    pub underperforming_reps: Vec<UnderperformingRep>,
    pub low_activity_accounts: Vec<LowActivityFinding>,
}

impl RiskFactors {
    /// Total inactive accounts across all low-activity findings.
    pub fn low_activity_count(&self) -> usize {
        self.low_activity_accounts.iter().map(|a| a.count).sum()
    }
}

/// Every view computed once, for offline reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Anchor date the views were computed against.
    pub anchor_date: String,
    /// Reporting quarter, e.g. `2026-Q1`.
    pub quarter: String,
    pub summary: Summary,
    pub drivers: Drivers,
    pub risk_factors: RiskFactors,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parsing() {
        let stage: DealStage = serde_json::from_str("\"Closed Won\"").unwrap();
        assert_eq!(stage, DealStage::ClosedWon);
        let stage: DealStage = serde_json::from_str("\"Negotiation\"").unwrap();
        assert_eq!(stage, DealStage::Negotiation);
        assert!(serde_json::from_str::<DealStage>("\"Won\"").is_err());
    }

    #[test]
    fn test_stage_is_open() {
        assert!(DealStage::Prospecting.is_open());
        assert!(DealStage::Negotiation.is_open());
        assert!(!DealStage::ClosedWon.is_open());
        assert!(!DealStage::ClosedLost.is_open());
        assert_eq!(DealStage::ClosedLost.to_string(), "Closed Lost");
    }

    #[test]
    fn test_deal_defaults() {
        let deal: Deal = serde_json::from_str(
            r#"{"deal_id":"D1","account_id":"A1","rep_id":"R1","stage":"Prospecting","created_at":"2025-11-02"}"#,
        )
        .unwrap();
        assert_eq!(deal.amount_or_zero(), 0.0);
        assert!(deal.closed_at.is_none());
        assert!(!deal.is_won());
    }

    #[test]
    fn test_views_use_camel_case() {
        let finding = StaleDealFinding {
            count: 2,
            segment: None,
            detail: "2 deals stuck over 30 days".to_string(),
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert!(json.get("segment").is_none());
        assert_eq!(json["count"], 2);

        let rep = UnderperformingRep {
            rep_name: "Dana".to_string(),
            rep_id: "R9".to_string(),
            metric: "Win Rate".to_string(),
            value: "10%".to_string(),
        };
        let json = serde_json::to_value(&rep).unwrap();
        assert_eq!(json["repName"], "Dana");
        assert_eq!(json["repId"], "R9");
    }

    #[test]
    fn test_delta_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeltaSource::Placeholder).unwrap(),
            "\"placeholder\""
        );
    }
}
