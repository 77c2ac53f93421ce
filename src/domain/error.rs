//! Domain validation errors for the canonical record types.
//!
//! Returned by validating constructors and by operations that reject
//! malformed input before computing anything.

use thiserror::Error;

use super::money::Money;

/// Errors that occur when a record violates a domain invariant.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Deal values are monetary amounts and must not be negative.
    #[error("deal value must be non-negative, got {value}")]
    NegativeValue {
        /// The invalid value that was provided.
        value: Money,
    },

    /// Win probability is a percentage.
    #[error("probability must be between 0 and 100, got {probability}")]
    ProbabilityOutOfRange {
        /// The invalid probability that was provided.
        probability: u8,
    },

    /// Stage names parsed from stored records must be known.
    #[error("unknown stage name: {name}")]
    UnknownStage {
        /// The unrecognized stage string.
        name: String,
    },

    /// Forecast horizons are bounded to keep period math meaningful.
    #[error("forecast horizon must be between 1 and 12 periods, got {horizon}")]
    HorizonOutOfRange {
        /// The invalid horizon that was requested.
        horizon: u32,
    },
}
