//! Pipeline stages and the coarse deal status derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A discrete step in the sales funnel.
///
/// The declaration order is the funnel order (`Lead` through `Negotiation`,
/// with `Won`/`Lost`/`OnHold` as terminal or suspended branches). The ordering
/// is advisory only: it drives default probabilities and display order, not
/// which transitions are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
    /// Suspended; keeps its probability until the deal resumes.
    #[serde(rename = "On Hold")]
    OnHold,
}

impl Stage {
    /// All stages, in funnel order.
    pub const ALL: [Stage; 7] = [
        Stage::Lead,
        Stage::Qualified,
        Stage::Proposal,
        Stage::Negotiation,
        Stage::Won,
        Stage::Lost,
        Stage::OnHold,
    ];

    /// The open working stages a deal moves through before closing.
    pub const WORKING: [Stage; 4] = [
        Stage::Lead,
        Stage::Qualified,
        Stage::Proposal,
        Stage::Negotiation,
    ];

    /// Advisory default win probability applied on transition into this stage.
    ///
    /// `None` for `OnHold`: a suspended deal keeps whatever probability it had.
    pub fn default_probability(self) -> Option<u8> {
        match self {
            Stage::Lead => Some(10),
            Stage::Qualified => Some(25),
            Stage::Proposal => Some(50),
            Stage::Negotiation => Some(75),
            Stage::Won => Some(100),
            Stage::Lost => Some(0),
            Stage::OnHold => None,
        }
    }

    /// The coarse status a deal in this stage carries.
    pub fn status(self) -> Status {
        match self {
            Stage::Won => Status::Won,
            Stage::Lost => Status::Lost,
            Stage::OnHold => Status::OnHold,
            _ => Status::Active,
        }
    }

    /// Returns true if this is a closing stage (`Won` or `Lost`).
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Won | Stage::Lost)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lead => "Lead",
            Stage::Qualified => "Qualified",
            Stage::Proposal => "Proposal",
            Stage::Negotiation => "Negotiation",
            Stage::Won => "Won",
            Stage::Lost => "Lost",
            Stage::OnHold => "On Hold",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Stage {
    type Err = DomainError;

    /// Parse a stage name. Accepts the wire spelling `"On Hold"` as well as
    /// `"OnHold"` for compatibility with existing stored records.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Lead" => Ok(Stage::Lead),
            "Qualified" => Ok(Stage::Qualified),
            "Proposal" => Ok(Stage::Proposal),
            "Negotiation" => Ok(Stage::Negotiation),
            "Won" => Ok(Stage::Won),
            "Lost" => Ok(Stage::Lost),
            "On Hold" | "OnHold" => Ok(Stage::OnHold),
            other => Err(DomainError::UnknownStage {
                name: other.to_string(),
            }),
        }
    }
}

/// Coarse deal state, always derived from [`Stage`] by the stage-transition
/// operation and never set independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Active,
    Won,
    Lost,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl Status {
    /// Returns true for deals still in the pipeline.
    pub fn is_active(self) -> bool {
        matches!(self, Status::Active)
    }

    /// Returns true for closed deals (`Won` or `Lost`).
    pub fn is_closed(self) -> bool {
        matches!(self, Status::Won | Status::Lost)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Active => "Active",
            Status::Won => "Won",
            Status::Lost => "Lost",
            Status::OnHold => "On Hold",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_probabilities_follow_funnel() {
        assert_eq!(Stage::Lead.default_probability(), Some(10));
        assert_eq!(Stage::Qualified.default_probability(), Some(25));
        assert_eq!(Stage::Proposal.default_probability(), Some(50));
        assert_eq!(Stage::Negotiation.default_probability(), Some(75));
        assert_eq!(Stage::Won.default_probability(), Some(100));
        assert_eq!(Stage::Lost.default_probability(), Some(0));
        assert_eq!(Stage::OnHold.default_probability(), None);
    }

    #[test]
    fn status_derivation() {
        assert_eq!(Stage::Won.status(), Status::Won);
        assert_eq!(Stage::Lost.status(), Status::Lost);
        assert_eq!(Stage::OnHold.status(), Status::OnHold);
        assert_eq!(Stage::Lead.status(), Status::Active);
        assert_eq!(Stage::Negotiation.status(), Status::Active);
    }

    #[test]
    fn parse_accepts_both_on_hold_spellings() {
        assert_eq!("On Hold".parse::<Stage>().unwrap(), Stage::OnHold);
        assert_eq!("OnHold".parse::<Stage>().unwrap(), Stage::OnHold);
    }

    #[test]
    fn parse_rejects_unknown_stage() {
        let err = "Prospect".parse::<Stage>().unwrap_err();
        assert!(matches!(err, DomainError::UnknownStage { name } if name == "Prospect"));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for stage in Stage::ALL {
            assert_eq!(stage.to_string().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn terminal_stages() {
        assert!(Stage::Won.is_terminal());
        assert!(Stage::Lost.is_terminal());
        assert!(!Stage::OnHold.is_terminal());
        assert!(!Stage::Proposal.is_terminal());
    }

    #[test]
    fn status_predicates() {
        assert!(Status::Active.is_active());
        assert!(!Status::OnHold.is_active());
        assert!(Status::Won.is_closed());
        assert!(Status::Lost.is_closed());
        assert!(!Status::Active.is_closed());
    }

    #[test]
    fn stage_serializes_with_wire_spelling() {
        let json = serde_json::to_string(&Stage::OnHold).unwrap();
        assert_eq!(json, "\"On Hold\"");
    }
}
