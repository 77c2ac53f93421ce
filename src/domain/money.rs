//! Monetary type for deal values and derived sums.

use rust_decimal::Decimal;

/// Monetary amount represented as a Decimal for precision.
///
/// Every deal value, pipeline sum, and revenue figure in the crate uses this
/// type; binary floating point is never used for currency.
pub type Money = Decimal;
