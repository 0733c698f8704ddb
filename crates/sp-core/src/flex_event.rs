//! Flex events - one-time exceptions that pause or reallocate goal funding.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{FlexEventId, GoalId, ValidationError};

/// A replacement amount for one goal while a flex event is active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdjustedAllocation {
    /// The goal whose computed allocation is overridden.
    pub goal_id: GoalId,
    /// The amount to use instead.
    pub new_amount: f64,
}

/// What the user decided to do about a flex event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RebalancingPlan {
    /// Goals whose contributions pause while the event is active.
    /// Must be a subset of the event's affected goals.
    #[serde(default)]
    pub paused_goals: BTreeSet<GoalId>,

    /// Explicit allocation overrides while the event is active.
    #[serde(default)]
    pub adjusted_allocations: Vec<AdjustedAllocation>,
}

/// A user-declared one-time exception (an unexpected bill, a bonus, a lean
/// month) applied on top of the allocator's output.
///
/// Flex events never rewrite past transactions; they only shape forward
/// allocation while active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlexEvent {
    /// Unique identifier.
    pub id: FlexEventId,

    /// When the event happened.
    pub date: NaiveDate,

    /// Why the user declared it.
    pub reason: String,

    /// Money involved in the event.
    pub amount: f64,

    /// Goals the event touches.
    #[serde(default)]
    pub affected_goals: BTreeSet<GoalId>,

    /// The user's rebalancing decision.
    #[serde(default)]
    pub plan: RebalancingPlan,

    /// When paused goals resume. `None` means until acknowledged-resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_date: Option<NaiveDate>,

    /// Whether the user has resolved the event.
    #[serde(default)]
    pub acknowledged: bool,
}

impl FlexEvent {
    /// Validates the event: every paused goal must be in the affected set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for goal_id in &self.plan.paused_goals {
            if !self.affected_goals.contains(goal_id) {
                return Err(ValidationError::PausedGoalNotAffected {
                    goal_id: goal_id.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether the event still shapes forward allocations on `date`.
    ///
    /// Active from its date until the resume date (if set), and never once
    /// acknowledged-resolved.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        if self.acknowledged || date < self.date {
            return false;
        }
        self.resume_date.is_none_or(|resume| date < resume)
    }
}
