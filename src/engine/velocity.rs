//! Time-in-stage velocity from the transition log.

use std::collections::BTreeMap;
use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Stage, TransitionLog};

/// Average dwell time for deals that left a stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageVelocity {
    /// Mean whole days between entering and leaving the stage, 0 when no
    /// entry/exit pair was observed.
    pub avg_days: Decimal,
    /// Number of matched entry/exit pairs behind the average.
    pub sample_size: u64,
}

/// Compute per-stage dwell times.
///
/// For every transition leaving a stage, the matching entry is the most
/// recent earlier transition of the same deal into that stage. Transitions
/// with no matched entry (the deal started there, so there is no record of
/// entering) are excluded from the sample. Every stage appears in the result,
/// zeroed when unsampled, mirroring [`stage_distribution`]'s fixed row set.
///
/// [`stage_distribution`]: super::stage_distribution
pub fn velocity(log: &TransitionLog) -> BTreeMap<Stage, StageVelocity> {
    let mut day_sums: BTreeMap<Stage, (i64, u64)> = BTreeMap::new();

    for (_, history) in log.histories() {
        // Histories are sorted, so a single pass tracking the last entry
        // time per stage pairs each exit with its most recent entry.
        let mut entered_at: HashMap<Stage, chrono::DateTime<chrono::Utc>> = HashMap::new();
        for transition in history {
            if let Some(entry_time) = entered_at.get(&transition.from_stage) {
                let days = (transition.changed_at - *entry_time).num_days();
                let (sum, count) = day_sums.entry(transition.from_stage).or_default();
                *sum += days;
                *count += 1;
            }
            entered_at.insert(transition.to_stage, transition.changed_at);
        }
    }

    Stage::ALL
        .into_iter()
        .map(|stage| {
            let metrics = match day_sums.get(&stage) {
                Some((sum, count)) if *count > 0 => StageVelocity {
                    avg_days: (Decimal::from(*sum) / Decimal::from(*count)).round_dp(1),
                    sample_size: *count,
                },
                _ => StageVelocity::default(),
            };
            (stage, metrics)
        })
        .collect()
}
