//! Per-stage pipeline distribution.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Money, Snapshot, Stage};

/// Aggregates for the deals currently sitting in one stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageMetrics {
    pub count: u64,
    pub total_value: Money,
    pub weighted_value: Money,
    /// Arithmetic mean of probability over the included deals, 0 when empty.
    pub avg_probability: Decimal,
}

/// Group the current pipeline by stage.
///
/// Only `Active` deals contribute; terminal and on-hold deals are excluded
/// from current-pipeline views. Every known stage is present in the result,
/// zeroed when it holds no deals, so dashboards can render a fixed row set.
pub fn stage_distribution(snapshot: &Snapshot) -> BTreeMap<Stage, StageMetrics> {
    let mut distribution: BTreeMap<Stage, StageMetrics> = Stage::ALL
        .into_iter()
        .map(|stage| (stage, StageMetrics::default()))
        .collect();
    let mut probability_sums: BTreeMap<Stage, Decimal> = BTreeMap::new();

    for deal in snapshot.valid_deals().filter(|d| d.is_active()) {
        let metrics = distribution
            .get_mut(&deal.stage)
            .expect("all stages pre-seeded");
        metrics.count += 1;
        metrics.total_value += deal.value;
        metrics.weighted_value += deal.weighted_value();
        *probability_sums.entry(deal.stage).or_default() += Decimal::from(deal.probability);
    }

    for (stage, metrics) in &mut distribution {
        if metrics.count > 0 {
            let sum = probability_sums.get(stage).copied().unwrap_or_default();
            metrics.avg_probability = (sum / Decimal::from(metrics.count)).round_dp(2);
        }
    }

    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::{active_deal, deal_in_stage};
    use crate::domain::TransitionLog;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_snapshot_yields_every_stage_zeroed() {
        let distribution = stage_distribution(&Snapshot::default());

        assert_eq!(distribution.len(), Stage::ALL.len());
        for stage in Stage::ALL {
            let metrics = &distribution[&stage];
            assert_eq!(metrics.count, 0);
            assert_eq!(metrics.total_value, dec!(0));
            assert_eq!(metrics.weighted_value, dec!(0));
            assert_eq!(metrics.avg_probability, dec!(0));
        }
    }

    #[test]
    fn only_active_deals_contribute() {
        let snapshot = Snapshot::new(
            vec![
                active_deal("d1", dec!(1000), Stage::Lead, 10),
                deal_in_stage("d2", dec!(5000), Stage::Won),
                deal_in_stage("d3", dec!(2000), Stage::Lost),
                deal_in_stage("d4", dec!(3000), Stage::OnHold),
            ],
            TransitionLog::default(),
            vec![],
            vec![],
        );

        let distribution = stage_distribution(&snapshot);
        assert_eq!(distribution[&Stage::Lead].count, 1);
        assert_eq!(distribution[&Stage::Won].count, 0);
        assert_eq!(distribution[&Stage::Lost].count, 0);
        assert_eq!(distribution[&Stage::OnHold].count, 0);
    }

    #[test]
    fn sums_and_averages_per_stage() {
        let snapshot = Snapshot::new(
            vec![
                active_deal("d1", dec!(1000), Stage::Qualified, 20),
                active_deal("d2", dec!(3000), Stage::Qualified, 30),
            ],
            TransitionLog::default(),
            vec![],
            vec![],
        );

        let metrics = &stage_distribution(&snapshot)[&Stage::Qualified];
        assert_eq!(metrics.count, 2);
        assert_eq!(metrics.total_value, dec!(4000));
        // 1000 * 20% + 3000 * 30%
        assert_eq!(metrics.weighted_value, dec!(1100));
        assert_eq!(metrics.avg_probability, dec!(25));
    }

    #[test]
    fn malformed_deal_is_skipped_not_fatal() {
        let mut bad = active_deal("bad", dec!(1000), Stage::Lead, 10);
        bad.probability = 130;
        let snapshot = Snapshot::new(
            vec![bad, active_deal("good", dec!(500), Stage::Lead, 10)],
            TransitionLog::default(),
            vec![],
            vec![],
        );

        let metrics = &stage_distribution(&snapshot)[&Stage::Lead];
        assert_eq!(metrics.count, 1);
        assert_eq!(metrics.total_value, dec!(500));
    }

    #[test]
    fn distribution_serializes_to_json() {
        let snapshot = Snapshot::new(
            vec![active_deal("d1", dec!(100), Stage::Lead, 10)],
            TransitionLog::default(),
            vec![],
            vec![],
        );
        let json = serde_json::to_value(stage_distribution(&snapshot)).unwrap();
        assert_eq!(json["Lead"]["count"], 1);
    }
}
