//! Per-goal amortization of the remaining target over the remaining months.

use chrono::NaiveDate;
use serde::Serialize;

use crate::goal::Goal;
use crate::timeline::{self, Month};
use crate::transaction::{Transaction, TransactionKind};
use crate::types::GoalId;

/// The contribution schedule for one goal as of a reference date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredContribution {
    /// The goal this schedule belongs to.
    pub goal_id: GoalId,
    /// Amount per month needed to reach the target on time.
    pub required_monthly: f64,
    /// 30-day installments left in the goal's window.
    pub months_remaining: u32,
    /// Whether the goal has started as of the reference date.
    pub has_started: bool,
}

/// Required monthly contribution for `goal` as of `today`.
///
/// A past-due goal (no installments left) owes the full remaining amount
/// now; that fallback is policy, not an error.
pub fn required_monthly(goal: &Goal, today: NaiveDate) -> f64 {
    let start = timeline::effective_start(goal.start_date, today);
    let months = timeline::months_remaining(start, goal.deadline);
    let remaining = goal.remaining_target();
    if months > 0 {
        remaining / f64::from(months)
    } else {
        remaining
    }
}

/// Full schedule for one goal, for per-goal display.
///
/// Reported even for goals that have not started: the host shows the
/// forward requirement, but must not fold it into portfolio totals.
pub fn contribution_schedule(goal: &Goal, today: NaiveDate) -> RequiredContribution {
    let start = timeline::effective_start(goal.start_date, today);
    RequiredContribution {
        goal_id: goal.id.clone(),
        required_monthly: required_monthly(goal, today),
        months_remaining: timeline::months_remaining(start, goal.deadline),
        has_started: goal.has_started(today),
    }
}

/// Required monthly contribution for `goal` in `month`, evaluated against
/// the plan as it stood when the month began.
///
/// The snapshot's `current_amount` already contains contributions recorded
/// during (and after) the month, which would shrink the requirement; those
/// are rolled back before amortizing.
pub fn planned_for_month(goal: &Goal, month: Month, transactions: &[Transaction]) -> f64 {
    let contributed_since: f64 = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Allocation)
        .filter(|tx| tx.goal_id.as_ref() == Some(&goal.id))
        .filter(|tx| tx.date >= month.first_day())
        .map(|tx| tx.amount)
        .sum();

    let mut as_of_start = goal.clone();
    as_of_start.current_amount = goal.current_amount - contributed_since;
    required_monthly(&as_of_start, month.first_day())
}

/// Portfolio-level required total per month.
///
/// Goals that have not started contribute nothing here, even though their
/// own `required_monthly` is still reported per goal.
pub fn portfolio_required_monthly(goals: &[Goal], today: NaiveDate) -> f64 {
    goals
        .iter()
        .filter(|goal| goal.has_started(today))
        .map(|goal| required_monthly(goal, today))
        .sum()
}
