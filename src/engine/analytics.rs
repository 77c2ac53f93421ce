//! Working-stage analytics: bottlenecks and high-value opportunities.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::distribution::StageMetrics;
use super::velocity::StageVelocity;
use crate::domain::{Money, Snapshot, Stage};

/// Thresholds for flagging bottlenecks and opportunities.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsThresholds {
    /// A stage whose average dwell time exceeds this many days is a
    /// bottleneck.
    #[serde(default = "default_bottleneck_days")]
    pub bottleneck_days: Decimal,
    /// Minimum value for the high-value opportunity flag.
    #[serde(default = "default_high_value_floor")]
    pub high_value_floor: Money,
    /// Minimum probability for the high-value opportunity flag.
    #[serde(default = "default_high_value_probability")]
    pub high_value_probability: u8,
}

fn default_bottleneck_days() -> Decimal {
    Decimal::from(14)
}

fn default_high_value_floor() -> Money {
    Money::from(10_000)
}

fn default_high_value_probability() -> u8 {
    60
}

impl Default for AnalyticsThresholds {
    fn default() -> Self {
        Self {
            bottleneck_days: default_bottleneck_days(),
            high_value_floor: default_high_value_floor(),
            high_value_probability: default_high_value_probability(),
        }
    }
}

/// A stage where deals dwell too long.
#[derive(Debug, Clone, Serialize)]
pub struct Bottleneck {
    pub stage: Stage,
    pub avg_days: Decimal,
    pub message: String,
}

/// Per-working-stage rollup with flagged bottlenecks and opportunities.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineAnalytics {
    /// Metrics for the open working stages (Lead through Negotiation).
    pub stages: Vec<WorkingStageMetrics>,
    pub bottlenecks: Vec<Bottleneck>,
    /// Count of active deals at or above the configured value and
    /// probability floors.
    pub high_value_deals: u64,
}

/// One working stage's distribution and dwell metrics side by side.
#[derive(Debug, Clone, Serialize)]
pub struct WorkingStageMetrics {
    pub stage: Stage,
    pub count: u64,
    pub total_value: Money,
    pub weighted_value: Money,
    pub avg_days: Decimal,
}

/// Roll up the working stages and flag where the funnel is stuck.
pub fn pipeline_analytics(
    snapshot: &Snapshot,
    thresholds: &AnalyticsThresholds,
) -> PipelineAnalytics {
    let distribution = super::stage_distribution(snapshot);
    let velocity = super::velocity(&snapshot.transitions);

    let stages: Vec<WorkingStageMetrics> = Stage::WORKING
        .into_iter()
        .map(|stage| {
            let StageMetrics {
                count,
                total_value,
                weighted_value,
                ..
            } = distribution[&stage].clone();
            let StageVelocity { avg_days, .. } = velocity[&stage].clone();
            WorkingStageMetrics {
                stage,
                count,
                total_value,
                weighted_value,
                avg_days,
            }
        })
        .collect();

    let bottlenecks = stages
        .iter()
        .filter(|s| s.avg_days > thresholds.bottleneck_days)
        .map(|s| Bottleneck {
            stage: s.stage,
            avg_days: s.avg_days,
            message: format!("deals are spending too long in {}", s.stage),
        })
        .collect();

    let high_value_deals = snapshot
        .valid_deals()
        .filter(|d| {
            d.is_active()
                && d.value >= thresholds.high_value_floor
                && d.probability >= thresholds.high_value_probability
        })
        .count() as u64;

    PipelineAnalytics {
        stages,
        bottlenecks,
        high_value_deals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::{active_deal, transition_on_day};
    use crate::domain::TransitionLog;
    use rust_decimal_macros::dec;

    #[test]
    fn slow_stage_is_flagged_as_bottleneck() {
        let log = TransitionLog::new(vec![
            transition_on_day("d1", Stage::Lead, Stage::Proposal, 1),
            transition_on_day("d1", Stage::Proposal, Stage::Negotiation, 21),
        ]);
        let snapshot = Snapshot::new(vec![], log, vec![], vec![]);

        let analytics = pipeline_analytics(&snapshot, &AnalyticsThresholds::default());
        assert_eq!(analytics.bottlenecks.len(), 1);
        assert_eq!(analytics.bottlenecks[0].stage, Stage::Proposal);
        assert_eq!(analytics.bottlenecks[0].avg_days, dec!(20));
    }

    #[test]
    fn high_value_deals_are_counted() {
        let snapshot = Snapshot::new(
            vec![
                active_deal("d1", dec!(50000), Stage::Negotiation, 75),
                active_deal("d2", dec!(15000), Stage::Proposal, 50),
                active_deal("d3", dec!(5000), Stage::Negotiation, 90),
            ],
            TransitionLog::default(),
            vec![],
            vec![],
        );

        let analytics = pipeline_analytics(&snapshot, &AnalyticsThresholds::default());
        // Only d1 clears both the value and probability floors.
        assert_eq!(analytics.high_value_deals, 1);
    }

    #[test]
    fn working_stages_only() {
        let analytics = pipeline_analytics(&Snapshot::default(), &AnalyticsThresholds::default());
        let stages: Vec<Stage> = analytics.stages.iter().map(|s| s.stage).collect();
        assert_eq!(stages, Stage::WORKING.to_vec());
        assert!(analytics.bottlenecks.is_empty());
    }
}
