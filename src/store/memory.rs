//! In-memory record store for tests and single-process embedding.

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use super::RecordStore;
use crate::domain::{Deal, DealId, StageTransition};
use crate::error::{Error, Result};

/// In-memory [`RecordStore`] backed by `RwLock`-protected maps.
///
/// Mints v4 UUID deal ids and enforces the versioned-update contract under
/// the write lock, so concurrent `move_stage` calls on the same deal resolve
/// to exactly one winner.
#[derive(Debug, Default)]
pub struct MemoryStore {
    deals: RwLock<HashMap<DealId, Deal>>,
    transitions: RwLock<Vec<StageTransition>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn deal(&self, id: &DealId) -> Result<Deal> {
        self.deals
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: "deal",
                id: id.to_string(),
            })
    }

    fn deals(&self) -> Result<Vec<Deal>> {
        Ok(self.deals.read().values().cloned().collect())
    }

    fn create_deal(&self, mut deal: Deal) -> Result<Deal> {
        deal.id = DealId::new(Uuid::new_v4().to_string());
        deal.version = 1;
        self.deals.write().insert(deal.id.clone(), deal.clone());
        Ok(deal)
    }

    fn update_deal(&self, deal: &Deal, expected_version: u64) -> Result<Deal> {
        let mut deals = self.deals.write();
        let stored = deals.get_mut(&deal.id).ok_or_else(|| Error::NotFound {
            kind: "deal",
            id: deal.id.to_string(),
        })?;

        if stored.version != expected_version {
            return Err(Error::Conflict {
                deal_id: deal.id.to_string(),
                expected: expected_version,
                found: stored.version,
            });
        }

        let mut updated = deal.clone();
        updated.version = expected_version + 1;
        *stored = updated.clone();
        Ok(updated)
    }

    fn append_transition(&self, transition: StageTransition) -> Result<()> {
        self.transitions.write().push(transition);
        Ok(())
    }

    fn transitions(&self) -> Result<Vec<StageTransition>> {
        Ok(self.transitions.read().clone())
    }

    fn latest_transition(&self, id: &DealId) -> Result<Option<StageTransition>> {
        Ok(self
            .transitions
            .read()
            .iter()
            .filter(|t| &t.deal_ref == id)
            .max_by_key(|t| t.changed_at)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerId, Stage};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn make_deal() -> Deal {
        Deal::try_new(
            DealId::new("unset"),
            CustomerId::new("c1"),
            "Store deal",
            dec!(500),
            Stage::Lead,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn create_mints_id_and_initial_version() {
        let store = MemoryStore::new();
        let created = store.create_deal(make_deal()).unwrap();

        assert_ne!(created.id.as_str(), "unset");
        assert_eq!(created.version, 1);
        assert_eq!(store.deal(&created.id).unwrap().version, 1);
    }

    #[test]
    fn missing_deal_is_not_found() {
        let store = MemoryStore::new();
        let err = store.deal(&DealId::new("nope")).unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "deal", .. }));
    }

    #[test]
    fn update_bumps_version() {
        let store = MemoryStore::new();
        let created = store.create_deal(make_deal()).unwrap();

        let mut changed = created.clone();
        changed.probability = 40;
        let committed = store.update_deal(&changed, created.version).unwrap();

        assert_eq!(committed.version, 2);
        assert_eq!(store.deal(&created.id).unwrap().probability, 40);
    }

    #[test]
    fn stale_version_is_rejected() {
        let store = MemoryStore::new();
        let created = store.create_deal(make_deal()).unwrap();

        let mut first = created.clone();
        first.probability = 40;
        store.update_deal(&first, created.version).unwrap();

        // Second writer still holds the original version.
        let mut second = created.clone();
        second.probability = 60;
        let err = store.update_deal(&second, created.version).unwrap_err();
        assert!(matches!(
            err,
            Error::Conflict {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn latest_transition_picks_newest_for_deal() {
        let store = MemoryStore::new();
        let id = DealId::new("d1");
        let older = StageTransition::new(
            id.clone(),
            Stage::Lead,
            Stage::Qualified,
            None,
            Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            None,
        );
        let newer = StageTransition::new(
            id.clone(),
            Stage::Qualified,
            Stage::Proposal,
            None,
            Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap(),
            None,
        );
        store.append_transition(newer.clone()).unwrap();
        store.append_transition(older).unwrap();

        let latest = store.latest_transition(&id).unwrap().unwrap();
        assert_eq!(latest.to_stage, Stage::Proposal);
        assert!(store
            .latest_transition(&DealId::new("other"))
            .unwrap()
            .is_none());
    }
}
