//! Heuristic funnel health scoring.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Snapshot, Stage, Status};

/// Tunable thresholds for the funnel health score.
///
/// The deductions are heuristics, not laws; deployments tune them through
/// configuration rather than code.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthThresholds {
    /// Deduct when more than this share (percent) of active deals sit in Lead.
    #[serde(default = "default_lead_share_pct")]
    pub lead_share_pct: Decimal,
    #[serde(default = "default_lead_penalty")]
    pub lead_penalty: u8,

    /// Deduct when more than this share (percent) of active deals are older
    /// than `stale_age_days`.
    #[serde(default = "default_stale_share_pct")]
    pub stale_share_pct: Decimal,
    #[serde(default = "default_stale_age_days")]
    pub stale_age_days: i64,
    #[serde(default = "default_stale_penalty")]
    pub stale_penalty: u8,

    /// Deduct when the overall win rate over closed deals is below this
    /// percentage.
    #[serde(default = "default_win_rate_floor_pct")]
    pub win_rate_floor_pct: Decimal,
    #[serde(default = "default_win_rate_penalty")]
    pub win_rate_penalty: u8,
}

fn default_lead_share_pct() -> Decimal {
    Decimal::from(60)
}

fn default_lead_penalty() -> u8 {
    20
}

fn default_stale_share_pct() -> Decimal {
    Decimal::from(30)
}

fn default_stale_age_days() -> i64 {
    90
}

fn default_stale_penalty() -> u8 {
    15
}

fn default_win_rate_floor_pct() -> Decimal {
    Decimal::from(20)
}

fn default_win_rate_penalty() -> u8 {
    25
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            lead_share_pct: default_lead_share_pct(),
            lead_penalty: default_lead_penalty(),
            stale_share_pct: default_stale_share_pct(),
            stale_age_days: default_stale_age_days(),
            stale_penalty: default_stale_penalty(),
            win_rate_floor_pct: default_win_rate_floor_pct(),
            win_rate_penalty: default_win_rate_penalty(),
        }
    }
}

/// Funnel health score with the issues that lowered it.
#[derive(Debug, Clone, Serialize)]
pub struct FunnelHealth {
    /// 0-100; starts at 100 and floors at 0.
    pub score: u8,
    pub issues: Vec<String>,
}

/// Score the funnel for imbalance, staleness, and win-rate weakness.
pub fn conversion_funnel_health(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    thresholds: &HealthThresholds,
) -> FunnelHealth {
    let mut score: i32 = 100;
    let mut issues = Vec::new();

    let active: Vec<_> = snapshot.valid_deals().filter(|d| d.is_active()).collect();

    if !active.is_empty() {
        let total = Decimal::from(active.len());
        let hundred = Decimal::from(100);

        let in_lead = active.iter().filter(|d| d.stage == Stage::Lead).count();
        let lead_share = Decimal::from(in_lead) / total * hundred;
        if lead_share > thresholds.lead_share_pct {
            score -= i32::from(thresholds.lead_penalty);
            issues.push(format!(
                "{}% of active deals are still in Lead; qualification is lagging",
                lead_share.round_dp(1)
            ));
        }

        let stale = active
            .iter()
            .filter(|d| d.age_days(now) > thresholds.stale_age_days)
            .count();
        let stale_share = Decimal::from(stale) / total * hundred;
        if stale_share > thresholds.stale_share_pct {
            score -= i32::from(thresholds.stale_penalty);
            issues.push(format!(
                "{}% of active deals are older than {} days",
                stale_share.round_dp(1),
                thresholds.stale_age_days
            ));
        }
    }

    let won = snapshot
        .valid_deals()
        .filter(|d| d.status == Status::Won)
        .count();
    let closed = snapshot.valid_deals().filter(|d| d.is_closed()).count();
    if closed > 0 {
        let win_rate = Decimal::from(won) / Decimal::from(closed) * Decimal::from(100);
        if win_rate < thresholds.win_rate_floor_pct {
            score -= i32::from(thresholds.win_rate_penalty);
            issues.push(format!(
                "win rate is {}%, below the {}% floor",
                win_rate.round_dp(1),
                thresholds.win_rate_floor_pct
            ));
        }
    }

    FunnelHealth {
        score: score.max(0) as u8,
        issues,
    }
}
