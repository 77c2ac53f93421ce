//! Record-store boundary.
//!
//! The engine is agnostic to whether records live in a relational database or
//! a document store; any backend that implements [`RecordStore`] can drive it.
//! [`MemoryStore`] is the bundled in-process implementation used by tests and
//! single-process embeddings.

mod memory;

pub use memory::MemoryStore;

use crate::domain::{Deal, DealId, StageTransition};
use crate::error::Result;

/// Data-access interface the engine's mutating operations go through.
///
/// All methods are synchronous; the engine itself never blocks on I/O, so a
/// networked backend is expected to adapt at this boundary.
pub trait RecordStore {
    /// Fetch one deal.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::error::Error::NotFound) when the deal does
    /// not exist.
    fn deal(&self, id: &DealId) -> Result<Deal>;

    /// List every deal.
    fn deals(&self) -> Result<Vec<Deal>>;

    /// Insert a new deal. The store mints the id and owns the version
    /// counter; the returned record carries both.
    fn create_deal(&self, deal: Deal) -> Result<Deal>;

    /// Commit an updated deal if its stored version still equals
    /// `expected_version`, bumping the version on success.
    ///
    /// This is the single-writer-per-deal guard: two actors racing to update
    /// the same deal from the same observed state cannot both win.
    ///
    /// # Errors
    ///
    /// [`Error::Conflict`](crate::error::Error::Conflict) when another writer
    /// committed first; [`Error::NotFound`](crate::error::Error::NotFound)
    /// when the deal does not exist.
    fn update_deal(&self, deal: &Deal, expected_version: u64) -> Result<Deal>;

    /// Append an immutable stage-transition record.
    fn append_transition(&self, transition: StageTransition) -> Result<()>;

    /// List every transition record.
    fn transitions(&self) -> Result<Vec<StageTransition>>;

    /// The most recent transition for one deal, if any.
    fn latest_transition(&self, id: &DealId) -> Result<Option<StageTransition>>;
}
