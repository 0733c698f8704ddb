//! Distributes a net income figure across goals under priority and
//! emergency-fund rules.
//!
//! One pass over the goal set in priority order. The emergency fund (if one
//! qualifies) is served first from a capped share, fixed contributions take
//! what they declared, and everything else receives a proportional share of
//! whatever is still in the pool.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::goal::Goal;
use crate::scenario::IncomeScenario;
use crate::types::GoalId;

/// Share of the remaining pool the emergency fund may claim up front.
pub const EMERGENCY_SHARE: f64 = 0.10;

/// Minimum priority weight for the emergency-first rule to apply.
pub const EMERGENCY_PRIORITY_FLOOR: u8 = 8;

/// Fraction of each proportional share actually allocated. The other half
/// stays in the pool as free-spend flexibility; this factor is a deliberate
/// design choice and downstream math depends on it.
pub const FLEX_FACTOR: f64 = 0.5;

/// How an allocation entry was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationKind {
    /// The emergency-first rule.
    Emergency,
    /// Ordinary priority-order processing.
    Goal,
}

/// One goal's share of a split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// The goal receiving the money.
    pub goal_id: GoalId,
    /// The goal's name, for rendering without a second lookup.
    pub goal_name: String,
    /// Amount allocated.
    pub amount: f64,
    /// How the entry was produced.
    pub kind: AllocationKind,
    /// True when the goal has not started yet: the entry is informational
    /// and is not money available this month.
    #[serde(default)]
    pub future: bool,
}

/// Result of one auto-split run.
///
/// For positive net income, `total_allocated + free_spend == net_income`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoSplitResult {
    /// The gross figure the run started from.
    pub gross_income: f64,
    /// Gross after the scenario's tax and fixed expenses. May be negative.
    pub net_income: f64,
    /// Allocations in processing order: emergency first, then priority
    /// descending with earlier deadlines winning ties.
    pub allocations: Vec<Allocation>,
    /// Money left unallocated. Never negative.
    pub free_spend: f64,
    /// Money handed to goals.
    pub total_allocated: f64,
}

/// Splits `gross_income` across `goals`.
///
/// Without a scenario the gross figure is treated as already net. The run
/// is pure: identical inputs produce identical output.
pub fn calculate_auto_split(
    gross_income: f64,
    scenario: Option<&IncomeScenario>,
    goals: &[Goal],
    today: NaiveDate,
) -> AutoSplitResult {
    let net_income = scenario.map_or(gross_income, |s| s.net_income(gross_income));

    if net_income <= 0.0 || goals.is_empty() {
        return AutoSplitResult {
            gross_income,
            net_income,
            allocations: Vec::new(),
            free_spend: net_income.max(0.0),
            total_allocated: 0.0,
        };
    }

    // Priority descending, earlier deadline wins ties.
    let mut ordered: Vec<&Goal> = goals.iter().collect();
    ordered.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.deadline.cmp(&b.deadline))
    });

    let mut remaining = net_income;
    let mut allocations = Vec::new();

    // Emergency fund first: a flagged (or legacy name-matched) goal at high
    // priority claims up to EMERGENCY_SHARE of the pool before anything else.
    let emergency_slot = ordered
        .iter()
        .position(|g| g.is_emergency() && g.priority.value() >= EMERGENCY_PRIORITY_FLOOR);
    if let Some(index) = emergency_slot {
        let goal = ordered.remove(index);
        let cap = remaining * EMERGENCY_SHARE;
        let amount = goal
            .monthly_contribution
            .map_or(cap, |declared| declared.min(cap));
        if amount > 0.0 {
            tracing::debug!(goal = %goal.id, amount, "emergency-first allocation");
            allocations.push(Allocation {
                goal_id: goal.id.clone(),
                goal_name: goal.name.clone(),
                amount,
                kind: AllocationKind::Emergency,
                future: !goal.has_started(today),
            });
            remaining -= amount;
        }
    }

    // The proportional weight pool covers the goals not yet processed and
    // shrinks as the loop advances, so each share is computed against what
    // is actually still competing for the remaining money.
    let mut weight_sum: f64 = ordered
        .iter()
        .map(|g| f64::from(g.priority.value()))
        .sum();

    for goal in ordered {
        if remaining <= 0.0 {
            break;
        }
        let weight = f64::from(goal.priority.value());
        let amount = match goal.monthly_contribution {
            Some(declared) if declared > 0.0 => declared.min(remaining),
            _ if weight_sum > 0.0 => remaining * (weight / weight_sum) * FLEX_FACTOR,
            _ => 0.0,
        };
        weight_sum -= weight;
        if amount <= 0.0 {
            continue;
        }
        allocations.push(Allocation {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            amount,
            kind: AllocationKind::Goal,
            future: !goal.has_started(today),
        });
        remaining -= amount;
    }

    AutoSplitResult {
        gross_income,
        net_income,
        total_allocated: net_income - remaining,
        free_spend: remaining.max(0.0),
        allocations,
    }
}
