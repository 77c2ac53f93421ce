//! The canonical deal record.
//!
//! One explicit structure used uniformly regardless of backing store;
//! adapters convert store-specific rows or documents into it at the boundary.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::ids::{ActorId, CustomerId, DealId};
use super::money::Money;
use super::stage::{Stage, Status};

/// A sales opportunity moving through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    /// Weak reference to the owning customer; the engine never manages
    /// customer lifecycle.
    pub customer_ref: CustomerId,
    pub title: String,
    /// Non-negative monetary amount.
    pub value: Money,
    pub stage: Stage,
    /// Win probability 0-100. Correlated with `stage` by convention only;
    /// stage transitions apply the stage default unless overridden.
    pub probability: u8,
    /// Always derived from `stage`; never set independently.
    pub status: Status,
    /// Used for forecast bucketing when present.
    pub expected_close: Option<NaiveDate>,
    pub created_date: DateTime<Utc>,
    /// Last modification time. Doubles as the close-date proxy for Won/Lost
    /// deals in cycle-length and actual-revenue computations.
    pub updated_date: DateTime<Utc>,
    /// Sales rep the deal is assigned to, when any.
    pub owner_ref: Option<ActorId>,
    /// Optimistic-concurrency token, owned and bumped by the record store.
    pub version: u64,
}

impl Deal {
    /// Create a validated deal in the given stage.
    ///
    /// Probability starts at the stage default (0 for a deal opened on hold)
    /// and status is derived from the stage. Optional fields are set through
    /// the `with_*` helpers.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NegativeValue`] for a negative value.
    pub fn try_new(
        id: DealId,
        customer_ref: CustomerId,
        title: impl Into<String>,
        value: Money,
        stage: Stage,
        created: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if value.is_sign_negative() {
            return Err(DomainError::NegativeValue { value });
        }

        Ok(Self {
            id,
            customer_ref,
            title: title.into(),
            value,
            stage,
            probability: stage.default_probability().unwrap_or(0),
            status: stage.status(),
            expected_close: None,
            created_date: created,
            updated_date: created,
            owner_ref: None,
            version: 0,
        })
    }

    /// Set the probability, consuming self.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ProbabilityOutOfRange`] above 100.
    pub fn with_probability(mut self, probability: u8) -> Result<Self, DomainError> {
        if probability > 100 {
            return Err(DomainError::ProbabilityOutOfRange { probability });
        }
        self.probability = probability;
        Ok(self)
    }

    /// Set the expected close date, consuming self.
    pub fn with_expected_close(mut self, date: NaiveDate) -> Self {
        self.expected_close = Some(date);
        self
    }

    /// Assign the deal to a sales rep, consuming self.
    pub fn with_owner(mut self, owner: ActorId) -> Self {
        self.owner_ref = Some(owner);
        self
    }

    /// Re-check the invariants on a record converted from an external store.
    ///
    /// Collection-level aggregations call this to skip malformed records
    /// instead of aborting.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.value.is_sign_negative() {
            return Err(DomainError::NegativeValue { value: self.value });
        }
        if self.probability > 100 {
            return Err(DomainError::ProbabilityOutOfRange {
                probability: self.probability,
            });
        }
        Ok(())
    }

    /// Risk-adjusted value: `value * probability / 100`, always derived.
    pub fn weighted_value(&self) -> Money {
        self.value * Decimal::from(self.probability) / Decimal::from(100)
    }

    /// Whole days since the deal was created.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_date).num_days()
    }

    /// True when the expected close date has passed and the deal is still
    /// active.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.expected_close {
            Some(close) if self.status.is_active() => close < now.date_naive(),
            _ => false,
        }
    }

    /// Returns true for deals still in the pipeline.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns true for closed deals (`Won` or `Lost`).
    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }
}

/// Filter a deal slice down to records that pass invariant validation,
/// warning on each skip.
///
/// Collection-level aggregations degrade gracefully instead of aborting on
/// one malformed record.
pub fn valid_deals(deals: &[Deal]) -> impl Iterator<Item = &Deal> {
    deals.iter().filter(|deal| match deal.validate() {
        Ok(()) => true,
        Err(reason) => {
            tracing::warn!(deal = %deal.id, %reason, "skipping malformed deal record");
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn deal(value: Money, stage: Stage) -> Deal {
        Deal::try_new(
            DealId::new("d1"),
            CustomerId::new("c1"),
            "Test deal",
            value,
            stage,
            at(2024, 1, 1),
        )
        .unwrap()
    }

    #[test]
    fn new_deal_takes_stage_defaults() {
        let d = deal(dec!(1000), Stage::Qualified);
        assert_eq!(d.probability, 25);
        assert_eq!(d.status, Status::Active);
    }

    #[test]
    fn negative_value_is_rejected() {
        let err = Deal::try_new(
            DealId::new("d1"),
            CustomerId::new("c1"),
            "Bad deal",
            dec!(-5),
            Stage::Lead,
            at(2024, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NegativeValue { .. }));
    }

    #[test]
    fn probability_above_100_is_rejected() {
        let err = deal(dec!(100), Stage::Lead).with_probability(101).unwrap_err();
        assert!(matches!(
            err,
            DomainError::ProbabilityOutOfRange { probability: 101 }
        ));
    }

    #[test]
    fn weighted_value_is_exact_for_every_probability() {
        for p in 0..=100u8 {
            let d = deal(dec!(100000), Stage::Negotiation).with_probability(p).unwrap();
            assert_eq!(
                d.weighted_value(),
                dec!(100000) * Decimal::from(p) / dec!(100)
            );
        }
    }

    #[test]
    fn weighted_value_scenario() {
        let d = deal(dec!(100000), Stage::Negotiation);
        assert_eq!(d.probability, 75);
        assert_eq!(d.weighted_value(), dec!(75000.0));
    }

    #[test]
    fn overdue_requires_active_status_and_past_close() {
        let now = at(2024, 6, 1);

        let overdue = deal(dec!(100), Stage::Proposal)
            .with_expected_close(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(overdue.is_overdue(now));

        let future = deal(dec!(100), Stage::Proposal)
            .with_expected_close(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert!(!future.is_overdue(now));

        let won = deal(dec!(100), Stage::Won)
            .with_expected_close(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(!won.is_overdue(now));
    }

    #[test]
    fn age_in_whole_days() {
        let d = deal(dec!(100), Stage::Lead);
        assert_eq!(d.age_days(at(2024, 2, 10)), 40);
    }

    #[test]
    fn validate_flags_out_of_range_probability() {
        let mut d = deal(dec!(100), Stage::Lead);
        d.probability = 150;
        assert!(d.validate().is_err());
    }
}
