//! Applies a flex event on top of the allocator's output.
//!
//! The rebalancer never rewrites past transactions: it turns a flex event
//! into forward-looking overrides, and applies those overrides to an
//! [`AutoSplitResult`] for the months the event is active.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::autosplit::{Allocation, AutoSplitResult};
use crate::flex_event::FlexEvent;
use crate::goal::Goal;
use crate::types::{EngineWarning, FlexEventId, GoalId, ValidationError};

/// Forward allocation overrides derived from one flex event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationOverrides {
    /// The event the overrides came from.
    pub event_id: FlexEventId,
    /// Goals whose allocation drops to zero while the event is active.
    pub paused: BTreeSet<GoalId>,
    /// Replacement amounts for explicitly listed goals.
    pub adjusted: BTreeMap<GoalId, f64>,
    /// Dangling references that were skipped.
    pub warnings: Vec<EngineWarning>,
}

/// Turns a flex event into allocation overrides against the supplied goals.
///
/// The `paused ⊆ affected` invariant is validated up front. References to
/// goals missing from the set are skipped and reported as warnings; partial
/// results remain useful.
pub fn rebalance_for_flex_event(
    event: &FlexEvent,
    goals: &[Goal],
) -> Result<AllocationOverrides, ValidationError> {
    event.validate()?;

    let known: BTreeSet<&GoalId> = goals.iter().map(|g| &g.id).collect();
    let mut warnings = Vec::new();

    let mut paused = BTreeSet::new();
    for goal_id in &event.plan.paused_goals {
        if known.contains(goal_id) {
            paused.insert(goal_id.clone());
        } else {
            tracing::warn!(event = %event.id, goal = %goal_id, "skipping pause of unknown goal");
            warnings.push(EngineWarning::UnknownGoalInFlexEvent {
                event_id: event.id.clone(),
                goal_id: goal_id.clone(),
            });
        }
    }

    let mut adjusted = BTreeMap::new();
    for adjustment in &event.plan.adjusted_allocations {
        if !known.contains(&adjustment.goal_id) {
            tracing::warn!(
                event = %event.id,
                goal = %adjustment.goal_id,
                "skipping adjustment of unknown goal"
            );
            warnings.push(EngineWarning::UnknownGoalInFlexEvent {
                event_id: event.id.clone(),
                goal_id: adjustment.goal_id.clone(),
            });
            continue;
        }
        // A pause beats an adjustment for the same goal.
        if paused.contains(&adjustment.goal_id) {
            continue;
        }
        adjusted.insert(adjustment.goal_id.clone(), adjustment.new_amount);
    }

    Ok(AllocationOverrides {
        event_id: event.id.clone(),
        paused,
        adjusted,
        warnings,
    })
}

/// Applies overrides to an allocator result.
///
/// Paused goals drop out (their money returns to free spend), adjusted
/// goals take the declared replacement amount. The input result is
/// untouched.
pub fn apply_overrides(
    result: &AutoSplitResult,
    overrides: &AllocationOverrides,
) -> AutoSplitResult {
    let mut allocations: Vec<Allocation> = Vec::with_capacity(result.allocations.len());
    for allocation in &result.allocations {
        if overrides.paused.contains(&allocation.goal_id) {
            continue;
        }
        let amount = overrides
            .adjusted
            .get(&allocation.goal_id)
            .copied()
            .unwrap_or(allocation.amount);
        if amount <= 0.0 {
            continue;
        }
        allocations.push(Allocation {
            amount,
            ..allocation.clone()
        });
    }

    let total_allocated: f64 = allocations.iter().map(|a| a.amount).sum();
    AutoSplitResult {
        gross_income: result.gross_income,
        net_income: result.net_income,
        allocations,
        // User-declared adjustments may overcommit; free spend floors at 0.
        free_spend: (result.net_income - total_allocated).max(0.0),
        total_allocated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosplit::calculate_auto_split;
    use crate::flex_event::{AdjustedAllocation, RebalancingPlan};
    use crate::types::PriorityWeight;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(id: &str, priority: u8, contribution: f64) -> Goal {
        Goal {
            id: GoalId::new(id).unwrap(),
            name: id.to_string(),
            target_amount: 50_000.0,
            start_date: Some(date(2025, 1, 1)),
            deadline: date(2026, 1, 1),
            priority: PriorityWeight::new(priority).unwrap(),
            monthly_contribution: Some(contribution),
            current_amount: 0.0,
            is_emergency_fund: false,
        }
    }

    fn goal_id(id: &str) -> GoalId {
        GoalId::new(id).unwrap()
    }

    fn event(paused: &[&str], adjusted: &[(&str, f64)]) -> FlexEvent {
        let mut affected: BTreeSet<GoalId> =
            paused.iter().map(|id| goal_id(id)).collect();
        affected.extend(adjusted.iter().map(|(id, _)| goal_id(id)));
        FlexEvent {
            id: FlexEventId::new("event-1").unwrap(),
            date: date(2025, 3, 1),
            reason: "Medical bill".to_string(),
            amount: 4_000.0,
            affected_goals: affected,
            plan: RebalancingPlan {
                paused_goals: paused.iter().map(|id| goal_id(id)).collect(),
                adjusted_allocations: adjusted
                    .iter()
                    .map(|(id, amount)| AdjustedAllocation {
                        goal_id: goal_id(id),
                        new_amount: *amount,
                    })
                    .collect(),
            },
            resume_date: None,
            acknowledged: false,
        }
    }

    #[test]
    fn pause_zeroes_a_goal_and_frees_the_money() {
        let goals = vec![goal("goal-a", 8, 3_000.0), goal("goal-b", 4, 2_000.0)];
        let split = calculate_auto_split(10_000.0, None, &goals, date(2025, 3, 1));

        let overrides = rebalance_for_flex_event(&event(&["goal-b"], &[]), &goals).unwrap();
        let adjusted = apply_overrides(&split, &overrides);

        assert!(
            adjusted
                .allocations
                .iter()
                .all(|a| a.goal_id.as_str() != "goal-b")
        );
        assert_eq!(adjusted.total_allocated, 3_000.0);
        assert_eq!(adjusted.free_spend, 7_000.0);
    }

    #[test]
    fn adjustment_replaces_the_computed_amount() {
        let goals = vec![goal("goal-a", 8, 3_000.0), goal("goal-b", 4, 2_000.0)];
        let split = calculate_auto_split(10_000.0, None, &goals, date(2025, 3, 1));

        let overrides =
            rebalance_for_flex_event(&event(&[], &[("goal-a", 1_200.0)]), &goals).unwrap();
        let adjusted = apply_overrides(&split, &overrides);

        let a = adjusted
            .allocations
            .iter()
            .find(|x| x.goal_id.as_str() == "goal-a")
            .unwrap();
        assert_eq!(a.amount, 1_200.0);
        assert_eq!(adjusted.total_allocated, 3_200.0);
        assert_eq!(adjusted.free_spend, 6_800.0);
    }

    #[test]
    fn conservation_survives_overrides() {
        let goals = vec![goal("goal-a", 8, 3_000.0), goal("goal-b", 4, 2_000.0)];
        let split = calculate_auto_split(10_000.0, None, &goals, date(2025, 3, 1));

        let overrides = rebalance_for_flex_event(
            &event(&["goal-b"], &[("goal-a", 500.0)]),
            &goals,
        )
        .unwrap();
        let adjusted = apply_overrides(&split, &overrides);

        assert!(
            (adjusted.total_allocated + adjusted.free_spend - adjusted.net_income).abs() < 1e-9
        );
    }

    #[test]
    fn invalid_pause_set_is_rejected() {
        let goals = vec![goal("goal-a", 8, 3_000.0)];
        let mut bad = event(&["goal-a"], &[]);
        bad.affected_goals.clear();
        assert!(matches!(
            rebalance_for_flex_event(&bad, &goals),
            Err(ValidationError::PausedGoalNotAffected { .. })
        ));
    }

    #[test]
    fn dangling_goal_reference_is_skipped_with_warning() {
        let goals = vec![goal("goal-a", 8, 3_000.0)];
        let overrides = rebalance_for_flex_event(
            &event(&["goal-ghost"], &[("goal-a", 900.0)]),
            &goals,
        )
        .unwrap();

        assert!(overrides.paused.is_empty());
        assert_eq!(overrides.adjusted.len(), 1);
        assert_eq!(overrides.warnings.len(), 1);
    }

    #[test]
    fn zeroing_adjustment_drops_the_entry() {
        let goals = vec![goal("goal-a", 8, 3_000.0)];
        let split = calculate_auto_split(10_000.0, None, &goals, date(2025, 3, 1));
        let overrides =
            rebalance_for_flex_event(&event(&[], &[("goal-a", 0.0)]), &goals).unwrap();
        let adjusted = apply_overrides(&split, &overrides);
        assert!(adjusted.allocations.is_empty());
        assert_eq!(adjusted.free_spend, 10_000.0);
    }
}
