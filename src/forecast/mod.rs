//! Revenue forecasting over future (or elapsed) calendar periods.

pub mod calendar;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Deal, DomainError, Money, Status, valid_deals};
use crate::error::Result;

/// Granularity of a forecast period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodType {
    /// `[start, end)` bounds of the period `offset` steps away from the one
    /// containing `anchor` (offset 0 = the current period).
    pub fn bounds(self, anchor: NaiveDate, offset: i32) -> (NaiveDate, NaiveDate) {
        match self {
            PeriodType::Monthly => {
                let (year, month) = calendar::shift_month(anchor.year(), anchor.month(), offset);
                calendar::month_bounds(year, month)
            }
            PeriodType::Quarterly => {
                let (year, quarter) = calendar::quarter_containing(anchor);
                // Quarters shift as 3-month steps from the quarter start.
                let (year, month) =
                    calendar::shift_month(year, (quarter - 1) * 3 + 1, offset * 3);
                calendar::quarter_bounds(year, calendar::quarter_of(month))
            }
            PeriodType::Yearly => calendar::year_bounds(anchor.year() + offset),
        }
    }

    /// Period key for a period starting at `starts`: `YYYY-MM`, `YYYY-Qn`,
    /// or `YYYY`.
    pub fn key(self, starts: NaiveDate) -> String {
        match self {
            PeriodType::Monthly => format!("{}-{:02}", starts.year(), starts.month()),
            PeriodType::Quarterly => {
                format!("{}-Q{}", starts.year(), calendar::quarter_of(starts.month()))
            }
            PeriodType::Yearly => format!("{}", starts.year()),
        }
    }
}

/// High-confidence threshold and band boundaries for forecast math.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// Deals at or above this probability count as expected revenue.
    #[serde(default = "default_high_confidence")]
    pub high_confidence_probability: u8,
    /// Lower bound of the medium probability band.
    #[serde(default = "default_medium_confidence")]
    pub medium_confidence_probability: u8,
}

fn default_high_confidence() -> u8 {
    70
}

fn default_medium_confidence() -> u8 {
    40
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            high_confidence_probability: default_high_confidence(),
            medium_confidence_probability: default_medium_confidence(),
        }
    }
}

/// Aggregates for one probability band of a period's deals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BandMetrics {
    pub count: u64,
    pub total_value: Money,
    pub weighted_value: Money,
}

/// Period deals bucketed by win probability.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbabilityBreakdown {
    /// At or above the high-confidence threshold.
    pub high: BandMetrics,
    /// Between the medium and high thresholds.
    pub medium: BandMetrics,
    /// Below the medium threshold.
    pub low: BandMetrics,
}

/// Projected (and optionally actual) revenue for one calendar period.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodForecast {
    /// Period key: `YYYY-MM`, `YYYY-Qn`, or `YYYY`.
    pub period: String,
    pub starts: NaiveDate,
    /// Exclusive end bound.
    pub ends: NaiveDate,
    /// Sum of value over active deals expected to close in the period.
    pub total_pipeline: Money,
    /// Sum of probability-weighted values.
    pub weighted_pipeline: Money,
    /// Sum of value over high-confidence deals only.
    pub expected_revenue: Money,
    /// Won revenue for elapsed periods; `None` for future ones. Uses
    /// `updated_date` of Won deals as the close-date proxy.
    pub actual_revenue: Option<Money>,
    pub deal_count: u64,
    pub breakdown: ProbabilityBreakdown,
}

/// Project pipeline value into the next `horizon` periods (1-12), starting
/// with the period containing `now`.
///
/// Pure function of its inputs and the injected clock: the same snapshot and
/// `now` always produce identical output. `actual_revenue` is left `None`;
/// use [`forecast_vs_actual`] for elapsed periods.
///
/// # Errors
///
/// [`DomainError::HorizonOutOfRange`] outside 1..=12.
pub fn forecast(
    deals: &[Deal],
    period_type: PeriodType,
    horizon: u32,
    now: DateTime<Utc>,
    config: &ForecastConfig,
) -> Result<Vec<PeriodForecast>> {
    check_horizon(horizon)?;
    let anchor = now.date_naive();

    Ok((0..horizon as i32)
        .map(|offset| build_period(deals, period_type, anchor, offset, false, config))
        .collect())
}

/// Forecast-vs-actual over the trailing `periods` calendar periods ending
/// with the one containing `now`.
///
/// Every returned period has begun, so `actual_revenue` is filled for each
/// (the current period carries actuals to date).
///
/// # Errors
///
/// [`DomainError::HorizonOutOfRange`] outside 1..=12.
pub fn forecast_vs_actual(
    deals: &[Deal],
    period_type: PeriodType,
    periods: u32,
    now: DateTime<Utc>,
    config: &ForecastConfig,
) -> Result<Vec<PeriodForecast>> {
    check_horizon(periods)?;
    let anchor = now.date_naive();

    Ok((1 - periods as i32..=0)
        .map(|offset| build_period(deals, period_type, anchor, offset, true, config))
        .collect())
}

fn check_horizon(horizon: u32) -> Result<()> {
    if !(1..=12).contains(&horizon) {
        return Err(DomainError::HorizonOutOfRange { horizon }.into());
    }
    Ok(())
}

fn build_period(
    deals: &[Deal],
    period_type: PeriodType,
    anchor: NaiveDate,
    offset: i32,
    with_actuals: bool,
    config: &ForecastConfig,
) -> PeriodForecast {
    let (starts, ends) = period_type.bounds(anchor, offset);
    let period = period_type.key(starts);

    let mut out = PeriodForecast {
        period,
        starts,
        ends,
        total_pipeline: Money::ZERO,
        weighted_pipeline: Money::ZERO,
        expected_revenue: Money::ZERO,
        actual_revenue: None,
        deal_count: 0,
        breakdown: ProbabilityBreakdown::default(),
    };

    for deal in valid_deals(deals).filter(|d| {
        d.is_active()
            && d.expected_close
                .is_some_and(|close| close >= starts && close < ends)
    }) {
        out.total_pipeline += deal.value;
        out.weighted_pipeline += deal.weighted_value();
        out.deal_count += 1;

        if deal.probability >= config.high_confidence_probability {
            out.expected_revenue += deal.value;
        }

        let band = if deal.probability >= config.high_confidence_probability {
            &mut out.breakdown.high
        } else if deal.probability >= config.medium_confidence_probability {
            &mut out.breakdown.medium
        } else {
            &mut out.breakdown.low
        };
        band.count += 1;
        band.total_value += deal.value;
        band.weighted_value += deal.weighted_value();
    }

    if with_actuals {
        out.actual_revenue = Some(
            valid_deals(deals)
                .filter(|d| {
                    d.status == Status::Won && {
                        let closed = d.updated_date.date_naive();
                        closed >= starts && closed < ends
                    }
                })
                .map(|d| d.value)
                .sum(),
        );
    }

    out
}
