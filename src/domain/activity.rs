//! Sales activity records (calls, emails, meetings) referencing a deal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::DealId;

/// A logged touchpoint or task on a deal.
///
/// The engine only reads completion state and timestamps; scheduling and
/// editing activities is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub deal_ref: DealId,
    pub completed: bool,
    pub created_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
}

impl Activity {
    /// Create an open activity.
    pub fn new(deal_ref: DealId, created: DateTime<Utc>) -> Self {
        Self {
            deal_ref,
            completed: false,
            created_date: created,
            completed_date: None,
        }
    }

    /// Create a completed activity.
    pub fn completed(deal_ref: DealId, created: DateTime<Utc>, completed: DateTime<Utc>) -> Self {
        Self {
            deal_ref,
            completed: true,
            created_date: created,
            completed_date: Some(completed),
        }
    }
}
