//! Pipeline aggregation engine.
//!
//! Pure, stateless computations over an immutable [`Snapshot`]: per-stage
//! distribution, conversion rates, dwell-time velocity, and funnel health.
//! The only mutating operation is [`move_stage`], which goes through the
//! record store with a versioned commit.

mod analytics;
mod conversion;
mod distribution;
mod health;
mod transition;
mod velocity;

pub use analytics::{
    AnalyticsThresholds, Bottleneck, PipelineAnalytics, WorkingStageMetrics, pipeline_analytics,
};
pub use conversion::conversion_rates;
pub use distribution::{StageMetrics, stage_distribution};
pub use health::{FunnelHealth, HealthThresholds, conversion_funnel_health};
pub use transition::{MoveStage, move_stage};
pub use velocity::{StageVelocity, velocity};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Snapshot, Stage};

/// Point-in-time aggregate over one snapshot.
///
/// Constructed per request and discarded after consumption; callers that
/// want caching own it externally (the engine stays cache-agnostic).
#[derive(Debug, Clone, Serialize)]
pub struct AggregateSnapshot {
    pub generated_at: DateTime<Utc>,
    pub distribution: BTreeMap<Stage, StageMetrics>,
    pub conversion: BTreeMap<Stage, BTreeMap<Stage, Decimal>>,
    pub velocity: BTreeMap<Stage, StageVelocity>,
    pub health: FunnelHealth,
}

/// Run every aggregate computation over one snapshot.
pub fn aggregate(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    thresholds: &HealthThresholds,
) -> AggregateSnapshot {
    AggregateSnapshot {
        generated_at: now,
        distribution: stage_distribution(snapshot),
        conversion: conversion_rates(&snapshot.transitions),
        velocity: velocity(&snapshot.transitions),
        health: conversion_funnel_health(snapshot, now, thresholds),
    }
}
