//! Stage-transition history records and the pre-indexed log over them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ActorId, DealId};
use super::stage::Stage;

/// Append-only record of a single stage change.
///
/// Created exactly once per stage change and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTransition {
    pub deal_ref: DealId,
    pub from_stage: Stage,
    pub to_stage: Stage,
    pub changed_by: Option<ActorId>,
    pub changed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl StageTransition {
    /// Create a transition record.
    pub fn new(
        deal_ref: DealId,
        from_stage: Stage,
        to_stage: Stage,
        changed_by: Option<ActorId>,
        changed_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        Self {
            deal_ref,
            from_stage,
            to_stage,
            changed_by,
            changed_at,
            notes,
        }
    }
}

/// Transition history indexed by deal and sorted by timestamp.
///
/// Built once per snapshot so velocity and conversion queries are in-memory
/// lookups instead of per-record searches.
#[derive(Debug, Clone, Default)]
pub struct TransitionLog {
    by_deal: HashMap<DealId, Vec<StageTransition>>,
    total: usize,
}

impl TransitionLog {
    /// Index a batch of transition records.
    pub fn new(transitions: Vec<StageTransition>) -> Self {
        let total = transitions.len();
        let mut by_deal: HashMap<DealId, Vec<StageTransition>> = HashMap::new();
        for t in transitions {
            by_deal.entry(t.deal_ref.clone()).or_default().push(t);
        }
        for history in by_deal.values_mut() {
            history.sort_by_key(|t| t.changed_at);
        }
        Self { by_deal, total }
    }

    /// All transitions for one deal, oldest first.
    pub fn for_deal(&self, id: &DealId) -> &[StageTransition] {
        self.by_deal.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The most recent transition for one deal, if any.
    pub fn latest_for_deal(&self, id: &DealId) -> Option<&StageTransition> {
        self.for_deal(id).last()
    }

    /// Iterate every transition, grouped by deal, oldest first within a deal.
    pub fn iter(&self) -> impl Iterator<Item = &StageTransition> {
        self.by_deal.values().flatten()
    }

    /// Iterate per-deal histories (each oldest first).
    pub fn histories(&self) -> impl Iterator<Item = (&DealId, &[StageTransition])> {
        self.by_deal.iter().map(|(id, h)| (id, h.as_slice()))
    }

    /// Total number of indexed transitions.
    pub fn len(&self) -> usize {
        self.total
    }

    /// True when the log holds no transitions.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
