//! Builders for records used across tests.
//!
//! Tests freeze time by passing explicit [`DateTime`] values; these helpers
//! keep construction terse so tests focus on assertions.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use crate::domain::{
    ActorId, Customer, CustomerId, Deal, DealId, Money, Stage, StageTransition, Status,
};

/// A fixed instant at noon UTC on the given date.
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// The default creation instant for builder records: 2024-01-01 noon UTC.
pub fn epoch() -> DateTime<Utc> {
    at(2024, 1, 1)
}

fn base_deal(id: &str, value: Money, stage: Stage) -> Deal {
    Deal::try_new(
        DealId::new(id),
        CustomerId::new("c1"),
        format!("Deal {id}"),
        value,
        stage,
        epoch(),
    )
    .unwrap()
}

/// An active deal with an explicit probability, created at [`epoch`].
pub fn active_deal(id: &str, value: Money, stage: Stage, probability: u8) -> Deal {
    base_deal(id, value, stage).with_probability(probability).unwrap()
}

/// A deal in any stage with the stage-default probability and derived
/// status, created at [`epoch`].
pub fn deal_in_stage(id: &str, value: Money, stage: Stage) -> Deal {
    base_deal(id, value, stage)
}

/// An active deal created `age_days` before `now`.
pub fn aged_deal(id: &str, stage: Stage, now: DateTime<Utc>, age_days: i64) -> Deal {
    let mut deal = base_deal(id, dec!(1000), stage);
    deal.created_date = now - Duration::days(age_days);
    deal.updated_date = deal.created_date;
    deal
}

/// An active deal created `days_ago` before `now`, for window tests.
pub fn deal_created(id: &str, now: DateTime<Utc>, days_ago: i64) -> Deal {
    aged_deal(id, Stage::Lead, now, days_ago)
}

/// An active deal expected to close on the given date.
pub fn closing_deal(id: &str, value: Money, probability: u8, year: i32, month: u32, day: u32) -> Deal {
    active_deal(id, value, Stage::Lead, probability)
        .with_expected_close(NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

/// A won deal whose `updated_date` (the close-date proxy) is noon UTC on the
/// given date.
pub fn won_deal_closed_at(id: &str, value: Money, year: i32, month: u32, day: u32) -> Deal {
    let mut deal = base_deal(id, value, Stage::Won);
    deal.updated_date = at(year, month, day);
    deal
}

/// A won deal closed `closed_days_ago` before `now` after a
/// `cycle_days`-long sales cycle.
pub fn won_deal_with_cycle(
    id: &str,
    value: Money,
    now: DateTime<Utc>,
    closed_days_ago: i64,
    cycle_days: i64,
) -> Deal {
    let mut deal = base_deal(id, value, Stage::Won);
    deal.updated_date = now - Duration::days(closed_days_ago);
    deal.created_date = deal.updated_date - Duration::days(cycle_days);
    deal
}

/// A deal assigned to `owner` with the given coarse status, created at
/// [`epoch`].
pub fn owned_deal(id: &str, owner: &str, value: Money, status: Status) -> Deal {
    let stage = match status {
        Status::Active => Stage::Proposal,
        Status::Won => Stage::Won,
        Status::Lost => Stage::Lost,
        Status::OnHold => Stage::OnHold,
    };
    base_deal(id, value, stage).with_owner(ActorId::new(owner))
}

/// A transition for `deal` at 09:00 UTC on the given day of January 2024.
pub fn transition_on_day(deal: &str, from: Stage, to: Stage, day: u32) -> StageTransition {
    StageTransition::new(
        DealId::new(deal),
        from,
        to,
        None,
        Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
        None,
    )
}

/// A customer created `days_ago` before `now` with the given status label.
pub fn customer_created(id: &str, status: &str, now: DateTime<Utc>, days_ago: i64) -> Customer {
    Customer::new(CustomerId::new(id), status, now - Duration::days(days_ago))
}
