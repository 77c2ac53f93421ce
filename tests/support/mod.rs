//! Shared helpers for integration tests.

use dealflow::domain::{Snapshot, TransitionLog};
use dealflow::store::{MemoryStore, RecordStore};

/// Assemble an aggregation snapshot from everything in a memory store.
pub fn snapshot_from(store: &MemoryStore) -> Snapshot {
    Snapshot::new(
        store.deals().unwrap(),
        TransitionLog::new(store.transitions().unwrap()),
        vec![],
        vec![],
    )
}
