//! Dealflow - Sales pipeline aggregation and forecasting engine.
//!
//! This crate provides the analytical core of a small-business CRM: given an
//! immutable snapshot of deal, stage-transition, customer, and activity
//! records, it computes pipeline distributions, conversion rates, dwell-time
//! velocity, funnel health, revenue forecasts, dashboard metrics, and
//! per-deal recommendations.
//!
//! # Architecture
//!
//! Every aggregate operation is a pure function of its input snapshot and an
//! explicitly injected clock, so results are deterministic and concurrent
//! invocation is trivially safe. The single mutating operation,
//! [`engine::move_stage`], commits through the [`store::RecordStore`]
//! boundary with optimistic versioning so concurrent writers on one deal
//! resolve to a single winner.
//!
//! # Modules
//!
//! - [`config`] - Threshold configuration from TOML files, logging setup
//! - [`domain`] - Store-agnostic records: deals, transitions, customers
//! - [`engine`] - Stage distribution, conversion, velocity, health, and the
//!   stage-transition state machine
//! - [`forecast`] - Calendar-correct revenue projection
//! - [`metrics`] - Dashboard rollups, trend series, team leaderboards
//! - [`advisor`] - Rule-based per-deal recommendations
//! - [`store`] - Record-store trait and the in-memory implementation
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use dealflow::domain::Snapshot;
//! use dealflow::engine::{self, HealthThresholds};
//!
//! let snapshot = Snapshot::default();
//! let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
//! let aggregate = engine::aggregate(&snapshot, now, &HealthThresholds::default());
//! assert_eq!(aggregate.health.score, 100);
//! ```

pub mod advisor;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod store;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
