//! Headline dashboard metrics over a trailing time window.

mod team;
mod trends;

pub use team::{OwnerPerformance, team_performance};
pub use trends::{TrendPoint, sales_trends};

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Money, Snapshot, Status};

/// Trailing reporting window.
///
/// Windows are fixed-day approximations (a month is 30 days, a year 365),
/// not calendar periods, consistent with how the dashboard has always
/// counted. Calendar-correct bucketing lives in [`crate::forecast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Since midnight (UTC).
    Today,
    /// Trailing 7 days.
    Week,
    /// Trailing 30 days.
    Month,
    /// Trailing 90 days.
    Quarter,
    /// Trailing 365 days.
    Year,
}

impl Period {
    /// Start of the trailing window ending at `now`.
    pub fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .expect("midnight is always valid")
                .and_utc(),
            Period::Week => now - Duration::days(7),
            Period::Month => now - Duration::days(30),
            Period::Quarter => now - Duration::days(90),
            Period::Year => now - Duration::days(365),
        }
    }

    /// Start of the same-length window immediately before this one, for
    /// growth-rate comparisons.
    pub fn previous_window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let start = self.window_start(now);
        match self {
            Period::Today => start - Duration::days(1),
            Period::Week => start - Duration::days(7),
            Period::Month => start - Duration::days(30),
            Period::Quarter => start - Duration::days(90),
            Period::Year => start - Duration::days(365),
        }
    }
}

/// Customer counts for the window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerMetrics {
    pub total: u64,
    pub new_in_period: u64,
    /// Counts keyed by the store's status labels.
    pub by_status: BTreeMap<String, u64>,
    /// New-customer growth vs the previous window, percent.
    pub growth_rate: Decimal,
}

/// Deal counts and money rollups for the window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DealMetrics {
    /// Deals created in the window.
    pub total_in_period: u64,
    /// Currently active deals, regardless of age.
    pub active: u64,
    /// Deals closed Won within the window.
    pub won_in_period: u64,
    /// Deals closed Lost within the window.
    pub lost_in_period: u64,
    /// Value of deals won in the window.
    pub total_revenue: Money,
    /// Value of all currently active deals.
    pub pipeline_value: Money,
    /// Probability-weighted value of all currently active deals.
    pub weighted_pipeline: Money,
    /// Mean value of deals won in the window, 0 when none.
    pub avg_deal_size: Decimal,
    /// Won share of deals closed in the window, percent; 0 with no closes.
    pub win_rate: Decimal,
    /// Created-deal growth vs the previous window, percent.
    pub growth_rate: Decimal,
}

/// Activity counts for the window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityMetrics {
    pub total_in_period: u64,
    /// Completed share of the window's activities, percent; 0 with none.
    pub completion_rate: Decimal,
    /// Window activities per known customer, 0 with no customers.
    pub per_customer: Decimal,
}

/// The dashboard headline numbers.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub period: Period,
    pub generated_at: DateTime<Utc>,
    pub customers: CustomerMetrics,
    pub deals: DealMetrics,
    pub activities: ActivityMetrics,
    /// New deals per new customer in the window, percent; 0 with none.
    pub customer_to_deal_conversion_rate: Decimal,
    /// Mean creation-to-close whole days over deals won in the window, 0
    /// when none. Uses `updated_date` as the close-date proxy.
    pub sales_cycle_days: Decimal,
}

/// Percentage `numerator / denominator * 100`, 0 when the denominator is 0.
fn rate(numerator: u64, denominator: u64) -> Decimal {
    if denominator == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(numerator) / Decimal::from(denominator) * Decimal::from(100)).round_dp(2)
    }
}

/// Growth of `current` over `previous` as a percentage, 0 when the previous
/// window had no records.
fn growth_rate(current: u64, previous: u64) -> Decimal {
    if previous == 0 {
        Decimal::ZERO
    } else {
        ((Decimal::from(current) - Decimal::from(previous)) / Decimal::from(previous)
            * Decimal::from(100))
        .round_dp(2)
    }
}

/// Compute the dashboard rollup for one trailing window.
///
/// Degrades gracefully: malformed deal records are skipped, every rate
/// guards its denominator, and an empty snapshot yields all-zero metrics
/// rather than an error.
pub fn dashboard_metrics(snapshot: &Snapshot, period: Period, now: DateTime<Utc>) -> DashboardMetrics {
    let start = period.window_start(now);
    let prev_start = period.previous_window_start(now);

    // Customers.
    let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
    for customer in &snapshot.customers {
        *by_status.entry(customer.status.clone()).or_default() += 1;
    }
    let new_customers = snapshot
        .customers
        .iter()
        .filter(|c| c.created_date >= start)
        .count() as u64;
    let prev_customers = snapshot
        .customers
        .iter()
        .filter(|c| c.created_date >= prev_start && c.created_date < start)
        .count() as u64;

    let customers = CustomerMetrics {
        total: snapshot.customers.len() as u64,
        new_in_period: new_customers,
        by_status,
        growth_rate: growth_rate(new_customers, prev_customers),
    };

    // Deals.
    let mut deals = DealMetrics::default();
    let mut prev_created = 0u64;
    let mut cycle_day_sum = 0i64;
    for deal in snapshot.valid_deals() {
        if deal.created_date >= start {
            deals.total_in_period += 1;
        } else if deal.created_date >= prev_start {
            prev_created += 1;
        }

        match deal.status {
            Status::Active => {
                deals.active += 1;
                deals.pipeline_value += deal.value;
                deals.weighted_pipeline += deal.weighted_value();
            }
            Status::Won if deal.updated_date >= start => {
                deals.won_in_period += 1;
                deals.total_revenue += deal.value;
                cycle_day_sum += (deal.updated_date - deal.created_date).num_days();
            }
            Status::Lost if deal.updated_date >= start => {
                deals.lost_in_period += 1;
            }
            _ => {}
        }
    }
    deals.win_rate = rate(
        deals.won_in_period,
        deals.won_in_period + deals.lost_in_period,
    );
    deals.growth_rate = growth_rate(deals.total_in_period, prev_created);
    deals.avg_deal_size = if deals.won_in_period == 0 {
        Decimal::ZERO
    } else {
        (deals.total_revenue / Decimal::from(deals.won_in_period)).round_dp(2)
    };
    let sales_cycle_days = if deals.won_in_period == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(cycle_day_sum) / Decimal::from(deals.won_in_period)).round_dp(1)
    };

    // Activities.
    let in_period: Vec<_> = snapshot
        .activities
        .iter()
        .filter(|a| a.created_date >= start)
        .collect();
    let completed = in_period.iter().filter(|a| a.completed).count() as u64;
    let activities = ActivityMetrics {
        total_in_period: in_period.len() as u64,
        completion_rate: rate(completed, in_period.len() as u64),
        per_customer: if snapshot.customers.is_empty() {
            Decimal::ZERO
        } else {
            (Decimal::from(in_period.len() as u64)
                / Decimal::from(snapshot.customers.len() as u64))
            .round_dp(2)
        },
    };

    let conversion = rate(deals.total_in_period, customers.new_in_period);

    DashboardMetrics {
        period,
        generated_at: now,
        customers,
        deals,
        activities,
        customer_to_deal_conversion_rate: conversion,
        sales_cycle_days,
    }
}
