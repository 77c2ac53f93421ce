//! The stage-transition state machine.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{ActorId, Deal, DealId, DomainError, Stage, StageTransition};
use crate::error::{Error, Result};
use crate::store::RecordStore;

/// A requested stage change.
///
/// Any stage-to-stage jump is accepted: the funnel ordering is advisory, and
/// restricting transitions (e.g. forbidding `Won` back to `Lead`) is a
/// product decision deliberately not taken here.
#[derive(Debug, Clone)]
pub struct MoveStage {
    pub new_stage: Stage,
    pub actor: Option<ActorId>,
    pub notes: Option<String>,
    /// Explicit probability override; when absent the stage default applies
    /// (and an on-hold deal keeps its current probability).
    pub probability: Option<u8>,
}

impl MoveStage {
    /// A plain move to `new_stage` with no actor, notes, or override.
    pub fn to(new_stage: Stage) -> Self {
        Self {
            new_stage,
            actor: None,
            notes: None,
            probability: None,
        }
    }

    /// Attach the acting sales rep.
    pub fn by(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Attach free-form notes for the history record.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Override the stage-default probability.
    pub fn with_probability(mut self, probability: u8) -> Self {
        self.probability = Some(probability);
        self
    }
}

/// Move a deal to a new stage.
///
/// On a real change this sets the stage, applies the stage-default
/// probability unless overridden, derives the coarse status, touches
/// `updated_date`, and appends exactly one [`StageTransition`], all
/// committed through the store's versioned update, so two actors racing on
/// the same deal resolve to one winner and one [`Error::Conflict`].
///
/// Moving a deal to the stage it is already in is an idempotent no-op: no
/// transition is appended and `updated_date` is untouched.
///
/// # Errors
///
/// - [`Error::NotFound`] when the deal does not exist.
/// - [`Error::Validation`] for a probability override above 100.
/// - [`Error::InconsistentState`] when the deal's recorded history disagrees
///   with its current stage; the mismatch is surfaced instead of appending
///   onto a corrupt log.
/// - [`Error::Conflict`] when a concurrent writer committed first.
pub fn move_stage(
    store: &impl RecordStore,
    deal_id: &DealId,
    request: MoveStage,
    now: DateTime<Utc>,
) -> Result<Deal> {
    let deal = store.deal(deal_id)?;

    if request.new_stage == deal.stage {
        debug!(deal = %deal_id, stage = %deal.stage, "stage unchanged, nothing to do");
        return Ok(deal);
    }

    if let Some(probability) = request.probability {
        if probability > 100 {
            return Err(Error::Validation(DomainError::ProbabilityOutOfRange {
                probability,
            }));
        }
    }

    if let Some(latest) = store.latest_transition(deal_id)? {
        if latest.to_stage != deal.stage {
            return Err(Error::InconsistentState {
                deal_id: deal_id.to_string(),
                logged: latest.to_stage,
                actual: deal.stage,
            });
        }
    }

    let from_stage = deal.stage;
    let mut updated = deal.clone();
    updated.stage = request.new_stage;
    updated.probability = request
        .probability
        .or_else(|| request.new_stage.default_probability())
        .unwrap_or(deal.probability);
    updated.status = request.new_stage.status();
    updated.updated_date = now;

    let committed = store.update_deal(&updated, deal.version)?;
    store.append_transition(StageTransition::new(
        deal_id.clone(),
        from_stage,
        request.new_stage,
        request.actor.clone(),
        now,
        request.notes,
    ))?;

    info!(
        deal = %deal_id,
        from = %from_stage,
        to = %request.new_stage,
        actor = request.actor.as_ref().map(|a| a.as_str()).unwrap_or("unknown"),
        "deal moved to new stage"
    );

    Ok(committed)
}
