//! Forward recomputation of a goal's schedule after a shortfall.
//!
//! Answers "what happens if this gap stands": the new required monthly,
//! whether the declared contribution can absorb it, how far the deadline
//! slips otherwise, and which other goals feel the squeeze. Projections are
//! read-only; goal state is never mutated.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::flex_event::FlexEvent;
use crate::goal::Goal;
use crate::timeline::{self, Month};
use crate::types::{EngineError, GoalId};

/// Widest deadline shift the projector searches before declaring the
/// deadline unreachable at the current contribution.
pub const MAX_DEADLINE_SHIFT_MONTHS: u32 = 600;

/// Default catch-up tolerance: the new required monthly may not exceed the
/// declared contribution at all. Callers may widen it.
pub const DEFAULT_CATCH_UP_TOLERANCE: f64 = 1.0;

/// Qualitative impact of a shortfall on a coupled goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalImpact {
    /// The goal's schedule stretches because available income shrank.
    Delayed,
    /// The goal sits in an active flex event's paused set.
    Paused,
    /// The goal's fixed contribution now competes with catch-up money.
    Reduced,
}

/// A coupled goal and how the shortfall touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedGoal {
    /// The coupled goal.
    pub goal_id: GoalId,
    /// Its name, for rendering without a second lookup.
    pub goal_name: String,
    /// How the shortfall touches it.
    pub impact: GoalImpact,
}

/// Read-only projection of a goal's trajectory after a shortfall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsequenceProjection {
    /// The goal that fell short.
    pub goal_id: GoalId,
    /// The shortfall being projected.
    pub shortfall: f64,
    /// The month the shortfall occurred in.
    #[serde(flatten)]
    pub month: Month,
    /// Amount still needed to reach the target.
    pub new_remaining: f64,
    /// 30-day installments between today and the deadline.
    pub months_remaining: u32,
    /// Required monthly contribution on the new trajectory.
    pub new_required_monthly: f64,
    /// Whether the declared contribution absorbs the new requirement
    /// (within the caller's tolerance).
    pub can_catch_up: bool,
    /// Months the deadline slips when catch-up fails. `None` while
    /// `can_catch_up`, or when no finite shift makes the goal reachable at
    /// the current contribution.
    pub deadline_shift_months: Option<u32>,
    /// The shifted deadline, when a finite shift exists.
    pub projected_deadline: Option<NaiveDate>,
    /// Other goals sharing a priority band or a flex-event coupling.
    pub affected_goals: Vec<AffectedGoal>,
}

/// Projects the consequence of a shortfall against `goal_id`.
///
/// `flex_events` supplies the coupling and pause context; `today` anchors
/// the remaining window. The supplied goal set is never mutated.
pub fn calculate_consequence(
    goal_id: &GoalId,
    shortfall: f64,
    month: Month,
    goals: &[Goal],
    flex_events: &[FlexEvent],
    today: NaiveDate,
    catch_up_tolerance: f64,
) -> Result<ConsequenceProjection, EngineError> {
    let goal = goals
        .iter()
        .find(|g| g.id == *goal_id)
        .ok_or_else(|| EngineError::UnknownGoal(goal_id.clone()))?;

    // No catch-up happened yet, so the remaining amount stands as-is.
    let new_remaining = goal.remaining_target();
    let months_remaining = timeline::months_remaining(today, goal.deadline);
    let new_required_monthly = if months_remaining > 0 {
        new_remaining / f64::from(months_remaining)
    } else {
        new_remaining
    };

    let declared = goal.declared_contribution();
    let can_catch_up = new_required_monthly <= declared * catch_up_tolerance;

    let mut deadline_shift_months = None;
    let mut projected_deadline = None;
    if !can_catch_up {
        if let Some(shift) = find_deadline_shift(new_remaining, months_remaining, declared) {
            deadline_shift_months = Some(shift);
            projected_deadline = goal.deadline.checked_add_months(Months::new(shift));
        } else {
            tracing::debug!(
                goal = %goal.id,
                "deadline unreachable at the declared contribution"
            );
        }
    }

    Ok(ConsequenceProjection {
        goal_id: goal.id.clone(),
        shortfall,
        month,
        new_remaining,
        months_remaining,
        new_required_monthly,
        can_catch_up,
        deadline_shift_months,
        projected_deadline,
        affected_goals: affected_goals(goal, goals, flex_events, today),
    })
}

/// Smallest shift `k` such that the remaining amount fits into
/// `months + k` installments of the declared contribution.
fn find_deadline_shift(remaining: f64, months: u32, declared: f64) -> Option<u32> {
    if declared <= 0.0 {
        return (remaining <= 0.0).then_some(0);
    }
    (0..=MAX_DEADLINE_SHIFT_MONTHS).find(|&shift| {
        let window = months + shift;
        window > 0 && remaining / f64::from(window) <= declared
    })
}

/// Goals coupled to `goal` by priority band or by a shared flex event, each
/// with a qualitative impact.
fn affected_goals(
    goal: &Goal,
    goals: &[Goal],
    flex_events: &[FlexEvent],
    today: NaiveDate,
) -> Vec<AffectedGoal> {
    let shares_event = |other: &Goal| {
        flex_events.iter().any(|event| {
            event.affected_goals.contains(&goal.id) && event.affected_goals.contains(&other.id)
        })
    };
    let paused = |other: &Goal| {
        flex_events
            .iter()
            .filter(|event| event.is_active_on(today))
            .any(|event| event.plan.paused_goals.contains(&other.id))
    };

    goals
        .iter()
        .filter(|other| other.id != goal.id)
        .filter(|other| other.priority == goal.priority || shares_event(other))
        .map(|other| {
            let impact = if paused(other) {
                GoalImpact::Paused
            } else if other.declared_contribution() <= 0.0 {
                // Funded from the flexible share: less availability
                // stretches its schedule.
                GoalImpact::Delayed
            } else {
                GoalImpact::Reduced
            };
            AffectedGoal {
                goal_id: other.id.clone(),
                goal_name: other.name.clone(),
                impact,
            }
        })
        .collect()
}
