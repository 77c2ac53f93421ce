use thiserror::Error;

use crate::domain::{DomainError, Stage};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    /// A referenced record is absent from the store or snapshot.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Malformed input rejected before computation.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// A stored record set violates an internal invariant.
    #[error("deal {deal_id} is in stage {actual} but its history ends at {logged}")]
    InconsistentState {
        deal_id: String,
        logged: Stage,
        actual: Stage,
    },

    /// A versioned update lost the race against a concurrent writer.
    #[error("concurrent update on deal {deal_id}: expected version {expected}, found {found}")]
    Conflict {
        deal_id: String,
        expected: u64,
        found: u64,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
