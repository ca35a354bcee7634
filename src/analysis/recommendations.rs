//! Recommendations derived from the risk factors.

use super::{compute_risk_factors, AnalysisError, ReportingContext};
use crate::data::Dataset;
use crate::models::RiskFactors;

/// Maximum number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Minimum number of recommendations returned.
pub const MIN_RECOMMENDATIONS: usize = 3;

/// Reps singled out for coaching.
const MAX_COACHING: usize = 2;

/// Appended when the risk factors produce too few recommendations.
const GENERIC: [&str; 2] = [
    "Review pipeline coverage for next quarter",
    "Align deal stages with forecast assumptions",
];

/// Last resort when even the generic pair leaves the list short.
const GENERIC_EXTRA: &str = "Track win rates weekly across the team";

/// Turn risk findings into an ordered list of 3 to 5 recommendations.
pub fn recommend(risks: &RiskFactors) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(top) = risks.stale_deals.first() {
        out.push(match &top.segment {
            Some(segment) => format!("Focus on aging deals in {} segment", segment),
            None => "Focus on aging deals in pipeline".to_string(),
        });
    }

    for rep in risks.underperforming_reps.iter().take(MAX_COACHING) {
        out.push(format!("Coach {} to improve closing skills", rep.rep_name));
    }

    if risks.low_activity_count() > 0 {
        out.push("Increase outreach to inactive accounts".to_string());
    }

    if out.len() < MIN_RECOMMENDATIONS {
        out.extend(GENERIC.iter().map(|s| s.to_string()));
    }
    if out.len() < MIN_RECOMMENDATIONS {
        out.push(GENERIC_EXTRA.to_string());
    }

    out.truncate(MAX_RECOMMENDATIONS);
    out
}

/// Compute the risk factors and derive recommendations from them.
pub fn compute_recommendations(
    data: &Dataset,
    ctx: &ReportingContext,
) -> Result<Vec<String>, AnalysisError> {
    let risks = compute_risk_factors(data, ctx)?;
    Ok(recommend(&risks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::*;
    use crate::models::{DealStage, LowActivityFinding, StaleDealFinding, UnderperformingRep};

    fn rep_finding(name: &str) -> UnderperformingRep {
        UnderperformingRep {
            rep_name: name.to_string(),
            rep_id: name.to_lowercase(),
            metric: "Win Rate".to_string(),
            value: "10%".to_string(),
        }
    }

    fn quiet(count: usize) -> Vec<LowActivityFinding> {
        vec![LowActivityFinding {
            count,
            detail: format!("{} Accounts with no recent activity", count),
        }]
    }

    fn stale(segment: Option<&str>) -> StaleDealFinding {
        StaleDealFinding {
            count: 3,
            segment: segment.map(String::from),
            detail: String::new(),
        }
    }

    #[test]
    fn test_all_risks_in_priority_order() {
        let risks = RiskFactors {
            stale_deals: vec![stale(Some("SMB")), stale(Some("Enterprise"))],
            underperforming_reps: vec![rep_finding("Ana"), rep_finding("Ben"), rep_finding("Cy")],
            low_activity_accounts: quiet(4),
        };

        assert_eq!(
            recommend(&risks),
            vec![
                "Focus on aging deals in SMB segment",
                "Coach Ana to improve closing skills",
                "Coach Ben to improve closing skills",
                "Increase outreach to inactive accounts",
            ]
        );
    }

    #[test]
    fn test_ungrouped_stale_finding() {
        let risks = RiskFactors {
            stale_deals: vec![stale(None)],
            underperforming_reps: vec![rep_finding("Ana")],
            low_activity_accounts: quiet(2),
        };

        let recs = recommend(&risks);
        assert_eq!(recs[0], "Focus on aging deals in pipeline");
        assert_eq!(recs.len(), 3);
    }

    #[test]
    fn test_padding_with_generic_recommendations() {
        let risks = RiskFactors {
            stale_deals: vec![stale(Some("SMB"))],
            underperforming_reps: vec![rep_finding("Ana")],
            low_activity_accounts: quiet(0),
        };

        assert_eq!(
            recommend(&risks),
            vec![
                "Focus on aging deals in SMB segment",
                "Coach Ana to improve closing skills",
                "Review pipeline coverage for next quarter",
                "Align deal stages with forecast assumptions",
            ]
        );
    }

    #[test]
    fn test_no_risks_still_yields_three() {
        let risks = RiskFactors {
            stale_deals: Vec::new(),
            underperforming_reps: Vec::new(),
            low_activity_accounts: quiet(0),
        };

        let recs = recommend(&risks);
        assert_eq!(recs.len(), MIN_RECOMMENDATIONS);
        assert_eq!(recs[2], GENERIC_EXTRA);
    }

    #[test]
    fn test_length_bounds_for_every_combination() {
        for stale_count in 0..3 {
            for reps in 0..4 {
                for inactive in 0..2 {
                    let risks = RiskFactors {
                        stale_deals: (0..stale_count).map(|_| stale(Some("SMB"))).collect(),
                        underperforming_reps: (0..reps)
                            .map(|i| rep_finding(&format!("Rep{}", i)))
                            .collect(),
                        low_activity_accounts: quiet(inactive),
                    };
                    let len = recommend(&risks).len();
                    assert!((MIN_RECOMMENDATIONS..=MAX_RECOMMENDATIONS).contains(&len));
                }
            }
        }
    }

    #[test]
    fn test_compute_from_dataset() {
        let mut data = dataset(vec![deal(
            "D1",
            DealStage::Negotiation,
            Some(10_000.0),
            "2025-12-01",
        )]);
        data.accounts = vec![account("A1", Some("Mid-Market"))];

        let recs = compute_recommendations(&data, &ReportingContext::default()).unwrap();
        assert_eq!(recs[0], "Focus on aging deals in Mid-Market segment");
        // The account has no activity at all.
        assert_eq!(recs[1], "Increase outreach to inactive accounts");
        assert_eq!(recs.len(), 4);
    }
}
