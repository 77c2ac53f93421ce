//! Trailing-period sales trend series for dashboard charts.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Money, Snapshot, Status};
use crate::error::Result;
use crate::forecast::PeriodType;
use crate::forecast::calendar;

/// One point in a trend series.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    /// Human label: `"Mar 2024"`, `"Q1 2024"`, or `"2024"`.
    pub label: String,
    /// Value of deals won in the period.
    pub revenue: Money,
    pub deals_won: u64,
    pub new_customers: u64,
    /// Won share of deals closed in the period, percent; 0 with no closes.
    pub win_rate: Decimal,
}

/// Win/revenue/customer series over the trailing `points` calendar periods,
/// oldest first, ending with the period containing `now`.
///
/// Periods are calendar-correct (unlike the trailing dashboard windows).
/// Deal closes use `updated_date` as the close-date proxy.
///
/// # Errors
///
/// [`DomainError::HorizonOutOfRange`](crate::domain::DomainError::HorizonOutOfRange)
/// outside 1..=12 points.
pub fn sales_trends(
    snapshot: &Snapshot,
    period_type: PeriodType,
    points: u32,
    now: DateTime<Utc>,
) -> Result<Vec<TrendPoint>> {
    if !(1..=12).contains(&points) {
        return Err(crate::domain::DomainError::HorizonOutOfRange { horizon: points }.into());
    }

    let anchor = now.date_naive();
    let mut series = Vec::with_capacity(points as usize);

    for offset in 1 - points as i32..=0 {
        let (starts, ends) = period_type.bounds(anchor, offset);
        let label = match period_type {
            PeriodType::Monthly => {
                format!("{} {}", month_abbrev(starts.month()), starts.year())
            }
            PeriodType::Quarterly => {
                format!("Q{} {}", calendar::quarter_of(starts.month()), starts.year())
            }
            PeriodType::Yearly => format!("{}", starts.year()),
        };

        let mut won = 0u64;
        let mut lost = 0u64;
        let mut revenue = Money::ZERO;
        for deal in snapshot.valid_deals() {
            let closed = deal.updated_date.date_naive();
            if closed < starts || closed >= ends {
                continue;
            }
            match deal.status {
                Status::Won => {
                    won += 1;
                    revenue += deal.value;
                }
                Status::Lost => lost += 1,
                _ => {}
            }
        }

        let new_customers = snapshot
            .customers
            .iter()
            .filter(|c| {
                let created = c.created_date.date_naive();
                created >= starts && created < ends
            })
            .count() as u64;

        let closed = won + lost;
        let win_rate = if closed == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(won) / Decimal::from(closed) * Decimal::from(100)).round_dp(2)
        };

        series.push(TrendPoint {
            label,
            revenue,
            deals_won: won,
            new_customers,
            win_rate,
        });
    }

    Ok(series)
}

fn month_abbrev(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}
