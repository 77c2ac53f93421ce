//! The immutable record bundle every aggregate operation consumes.

use super::activity::Activity;
use super::customer::Customer;
use super::deal::{Deal, valid_deals};
use super::ids::ActorId;
use super::transition::TransitionLog;

/// A point-in-time copy of the records the engine computes over.
///
/// All record retrieval happens before the engine is invoked; the engine
/// never issues further queries mid-computation. Because a snapshot is never
/// mutated, concurrent aggregation over the same snapshot is trivially safe.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub deals: Vec<Deal>,
    pub transitions: TransitionLog,
    pub customers: Vec<Customer>,
    pub activities: Vec<Activity>,
}

impl Snapshot {
    /// Bundle records into a snapshot.
    pub fn new(
        deals: Vec<Deal>,
        transitions: TransitionLog,
        customers: Vec<Customer>,
        activities: Vec<Activity>,
    ) -> Self {
        Self {
            deals,
            transitions,
            customers,
            activities,
        }
    }

    /// Deals that pass invariant validation.
    ///
    /// Aggregations degrade gracefully: a malformed record (negative value,
    /// out-of-range probability) is skipped with a warning instead of
    /// aborting the whole computation.
    pub fn valid_deals(&self) -> impl Iterator<Item = &Deal> {
        valid_deals(&self.deals)
    }

    /// Restrict the snapshot to one sales rep's deals.
    ///
    /// Keeps the deals assigned to `owner` and the activities referencing
    /// them. Customers carry no owner in this model and pass through
    /// unscoped; the transition log is shared.
    pub fn scoped_to(&self, owner: &ActorId) -> Snapshot {
        let deals: Vec<Deal> = self
            .deals
            .iter()
            .filter(|d| d.owner_ref.as_ref() == Some(owner))
            .cloned()
            .collect();
        let activities = self
            .activities
            .iter()
            .filter(|a| deals.iter().any(|d| d.id == a.deal_ref))
            .cloned()
            .collect();

        Snapshot {
            deals,
            transitions: self.transitions.clone(),
            customers: self.customers.clone(),
            activities,
        }
    }
}
