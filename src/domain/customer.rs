//! Customer records, treated as opaque grouping labels by the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CustomerId;

/// A customer referenced by deals.
///
/// The engine never manages customer lifecycle; it only counts customers and
/// groups them by their status label (`"Lead"`, `"Prospect"`, `"Active"`,
/// `"Inactive"`, or whatever taxonomy the caller's store uses).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub status: String,
    pub created_date: DateTime<Utc>,
}

impl Customer {
    /// Create a customer record.
    pub fn new(id: CustomerId, status: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id,
            status: status.into(),
            created_date: created,
        }
    }
}
