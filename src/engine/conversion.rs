//! Stage-to-stage conversion rates from the transition log.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::{Stage, TransitionLog};

/// Percentage of transitions out of each stage that landed in each
/// destination stage.
///
/// For a given `from_stage`, the row's percentages sum to 100 (up to
/// rounding; values carry 2 decimal places). Stages with zero outgoing
/// transitions are omitted from the outer map entirely: an absent row means
/// "no data", which consumers could not distinguish from an all-zero row.
pub fn conversion_rates(log: &TransitionLog) -> BTreeMap<Stage, BTreeMap<Stage, Decimal>> {
    let mut outgoing: BTreeMap<Stage, BTreeMap<Stage, u64>> = BTreeMap::new();

    for transition in log.iter() {
        *outgoing
            .entry(transition.from_stage)
            .or_default()
            .entry(transition.to_stage)
            .or_default() += 1;
    }

    outgoing
        .into_iter()
        .map(|(from, destinations)| {
            let total: u64 = destinations.values().sum();
            let rates = destinations
                .into_iter()
                .map(|(to, count)| {
                    let rate =
                        (Decimal::from(count) / Decimal::from(total) * Decimal::from(100)).round_dp(2);
                    (to, rate)
                })
                .collect();
            (from, rates)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::transition_on_day;
    use rust_decimal_macros::dec;

    #[test]
    fn splits_outgoing_transitions_into_percentages() {
        let log = TransitionLog::new(vec![
            transition_on_day("d1", Stage::Lead, Stage::Qualified, 1),
            transition_on_day("d2", Stage::Lead, Stage::Qualified, 2),
            transition_on_day("d3", Stage::Lead, Stage::Qualified, 3),
            transition_on_day("d4", Stage::Lead, Stage::Lost, 4),
        ]);

        let rates = conversion_rates(&log);
        let lead = &rates[&Stage::Lead];
        assert_eq!(lead[&Stage::Qualified], dec!(75.0));
        assert_eq!(lead[&Stage::Lost], dec!(25.0));
    }

    #[test]
    fn stages_with_no_outgoing_transitions_are_omitted() {
        let log = TransitionLog::new(vec![transition_on_day(
            "d1",
            Stage::Lead,
            Stage::Qualified,
            1,
        )]);

        let rates = conversion_rates(&log);
        assert!(rates.contains_key(&Stage::Lead));
        assert!(!rates.contains_key(&Stage::Proposal));
        assert!(!rates.contains_key(&Stage::Qualified));
    }

    #[test]
    fn empty_log_yields_empty_matrix() {
        assert!(conversion_rates(&TransitionLog::default()).is_empty());
    }

    #[test]
    fn rates_are_rounded_to_two_decimals() {
        let log = TransitionLog::new(vec![
            transition_on_day("d1", Stage::Proposal, Stage::Negotiation, 1),
            transition_on_day("d2", Stage::Proposal, Stage::Negotiation, 2),
            transition_on_day("d3", Stage::Proposal, Stage::Lost, 3),
        ]);

        let proposal = &conversion_rates(&log)[&Stage::Proposal];
        assert_eq!(proposal[&Stage::Negotiation], dec!(66.67));
        assert_eq!(proposal[&Stage::Lost], dec!(33.33));
    }
}
