//! Rule-based deal recommendations.
//!
//! Each rule fires independently; the returned list is in rule order, not
//! sorted by severity. Thresholds live in [`AdvisorRules`] so deployments
//! can tune them without code changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Activity, Deal, Money, Stage};

/// How loud a recommendation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Urgent,
    Opportunity,
    Success,
}

/// One advisory message for a deal.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub message: String,
    /// Suggested next step for the sales rep.
    pub action: String,
}

/// Tunable thresholds for the advisory rules.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorRules {
    /// "Closes soon" window in days.
    #[serde(default = "default_closing_soon_days")]
    pub closing_soon_days: i64,
    /// Age in days after which a Lead-stage deal counts as stale.
    #[serde(default = "default_stale_lead_days")]
    pub stale_lead_days: i64,
    /// Proposal-stage deals below this probability get flagged.
    #[serde(default = "default_low_proposal_probability")]
    pub low_proposal_probability: u8,
    /// Value floor for the early-stage high-value flag.
    #[serde(default = "default_high_value_floor")]
    pub high_value_floor: Money,
    /// Days without a touchpoint before the no-recent-activity flag.
    #[serde(default = "default_touchpoint_days")]
    pub touchpoint_days: i64,
}

fn default_closing_soon_days() -> i64 {
    7
}

fn default_stale_lead_days() -> i64 {
    30
}

fn default_low_proposal_probability() -> u8 {
    50
}

fn default_high_value_floor() -> Money {
    Money::from(100_000)
}

fn default_touchpoint_days() -> i64 {
    7
}

impl Default for AdvisorRules {
    fn default() -> Self {
        Self {
            closing_soon_days: default_closing_soon_days(),
            stale_lead_days: default_stale_lead_days(),
            low_proposal_probability: default_low_proposal_probability(),
            high_value_floor: default_high_value_floor(),
            touchpoint_days: default_touchpoint_days(),
        }
    }
}

/// Expected probability ceiling for each working stage; a deal above its
/// stage's ceiling is probably ready to advance.
fn probability_ceiling(stage: Stage) -> Option<u8> {
    match stage {
        Stage::Lead => Some(20),
        Stage::Qualified => Some(40),
        Stage::Proposal => Some(60),
        Stage::Negotiation => Some(90),
        _ => None,
    }
}

/// Produce advisory messages for one deal.
///
/// `activities` should be the deal's activity records (entries referencing
/// other deals are ignored).
pub fn recommendations(
    deal: &Deal,
    activities: &[Activity],
    now: DateTime<Utc>,
    rules: &AdvisorRules,
) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let today = now.date_naive();

    if let Some(close) = deal.expected_close {
        let days_to_close = (close - today).num_days();
        if deal.is_active() && days_to_close < 0 {
            out.push(Recommendation {
                severity: Severity::Urgent,
                message: format!(
                    "deal is {} days past its expected close date",
                    -days_to_close
                ),
                action: "Re-negotiate the close date or close the deal out".into(),
            });
        }
        if deal.is_active() && days_to_close > 0 && days_to_close <= rules.closing_soon_days {
            out.push(Recommendation {
                severity: Severity::Warning,
                message: format!("deal is expected to close in {days_to_close} days"),
                action: "Intensify engagement and finalize terms".into(),
            });
        }
    }

    if deal.stage == Stage::Lead && deal.age_days(now) > rules.stale_lead_days {
        out.push(Recommendation {
            severity: Severity::Info,
            message: format!("lead has gone unqualified for {} days", deal.age_days(now)),
            action: "Qualify or disqualify this lead".into(),
        });
    }

    if deal.stage == Stage::Proposal && deal.probability < rules.low_proposal_probability {
        out.push(Recommendation {
            severity: Severity::Info,
            message: format!(
                "probability {}% is low for the Proposal stage",
                deal.probability
            ),
            action: "Review deal qualification and update the probability".into(),
        });
    }

    if deal.value > rules.high_value_floor
        && matches!(deal.stage, Stage::Lead | Stage::Qualified)
    {
        out.push(Recommendation {
            severity: Severity::Opportunity,
            message: format!("high-value deal ({}) still in {}", deal.value, deal.stage),
            action: "Prioritize resources on advancing this deal".into(),
        });
    }

    let last_touch = activities
        .iter()
        .filter(|a| a.deal_ref == deal.id)
        .map(|a| a.created_date)
        .max();
    let touched_recently = last_touch
        .is_some_and(|t| (now - t).num_days() < rules.touchpoint_days);
    if !touched_recently {
        out.push(Recommendation {
            severity: Severity::Warning,
            message: "no recent activity on this deal".into(),
            action: "Schedule a touchpoint with the customer".into(),
        });
    }

    if let Some(ceiling) = probability_ceiling(deal.stage) {
        if deal.probability > ceiling {
            out.push(Recommendation {
                severity: Severity::Success,
                message: format!(
                    "probability {}% is high for the {} stage",
                    deal.probability, deal.stage
                ),
                action: "Consider moving the deal to the next stage".into(),
            });
        }
    }

    out
}
