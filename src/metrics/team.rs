//! Per-owner sales performance rollups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{ActorId, Deal, Money, Status, valid_deals};

/// One sales rep's totals, sorted into the leaderboard by revenue.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerPerformance {
    pub owner: ActorId,
    pub total_deals: u64,
    pub won_deals: u64,
    pub lost_deals: u64,
    pub active_deals: u64,
    /// Value of won deals.
    pub total_revenue: Money,
    /// Value of active deals.
    pub pipeline_value: Money,
    /// Won share of closed deals, percent; 0 with no closes.
    pub win_rate: Decimal,
    /// Mean value of won deals, 0 with no wins.
    pub avg_deal_size: Decimal,
}

impl OwnerPerformance {
    fn new(owner: ActorId) -> Self {
        Self {
            owner,
            total_deals: 0,
            won_deals: 0,
            lost_deals: 0,
            active_deals: 0,
            total_revenue: Money::ZERO,
            pipeline_value: Money::ZERO,
            win_rate: Decimal::ZERO,
            avg_deal_size: Decimal::ZERO,
        }
    }
}

/// Group deals by owner and rank by won revenue, descending.
///
/// `window` optionally restricts to deals created inside `[start, end)`.
/// Unassigned deals are skipped; they belong to no one's numbers.
pub fn team_performance(
    deals: &[Deal],
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Vec<OwnerPerformance> {
    let mut by_owner: HashMap<ActorId, OwnerPerformance> = HashMap::new();

    for deal in valid_deals(deals) {
        let Some(owner) = &deal.owner_ref else {
            continue;
        };
        if let Some((start, end)) = window {
            if deal.created_date < start || deal.created_date >= end {
                continue;
            }
        }

        let entry = by_owner
            .entry(owner.clone())
            .or_insert_with(|| OwnerPerformance::new(owner.clone()));
        entry.total_deals += 1;
        match deal.status {
            Status::Won => {
                entry.won_deals += 1;
                entry.total_revenue += deal.value;
            }
            Status::Lost => entry.lost_deals += 1,
            Status::Active => {
                entry.active_deals += 1;
                entry.pipeline_value += deal.value;
            }
            Status::OnHold => {}
        }
    }

    let mut leaderboard: Vec<OwnerPerformance> = by_owner
        .into_values()
        .map(|mut entry| {
            let closed = entry.won_deals + entry.lost_deals;
            if closed > 0 {
                entry.win_rate = (Decimal::from(entry.won_deals) / Decimal::from(closed)
                    * Decimal::from(100))
                .round_dp(2);
            }
            if entry.won_deals > 0 {
                entry.avg_deal_size =
                    (entry.total_revenue / Decimal::from(entry.won_deals)).round_dp(2);
            }
            entry
        })
        .collect();

    leaderboard.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
    leaderboard
}
