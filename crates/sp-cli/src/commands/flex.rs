//! Flex command: declare a one-time rebalancing event.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sp_core::{
    AdjustedAllocation, FlexEvent, FlexEventId, GoalId, RebalancingPlan,
    rebalance_for_flex_event,
};
use uuid::Uuid;

use crate::commands::util::resolve_goal;
use crate::store::PlanStore;

pub struct FlexArgs {
    pub date: NaiveDate,
    pub reason: String,
    pub amount: f64,
    pub affected: Vec<String>,
    pub paused: Vec<String>,
    pub adjusted: Vec<(String, f64)>,
    pub resume: Option<NaiveDate>,
}

pub fn run(store: &PlanStore, args: FlexArgs) -> Result<()> {
    let snapshot = store.load()?;

    let resolve = |reference: &str| -> Result<GoalId> {
        Ok(resolve_goal(&snapshot, reference)?.id.clone())
    };

    let event = FlexEvent {
        id: FlexEventId::new(Uuid::new_v4().to_string())
            .context("generated event ID was invalid")?,
        date: args.date,
        reason: args.reason,
        amount: args.amount,
        affected_goals: args
            .affected
            .iter()
            .map(|r| resolve(r))
            .collect::<Result<_>>()?,
        plan: RebalancingPlan {
            paused_goals: args
                .paused
                .iter()
                .map(|r| resolve(r))
                .collect::<Result<_>>()?,
            adjusted_allocations: args
                .adjusted
                .iter()
                .map(|(r, amount)| {
                    Ok(AdjustedAllocation {
                        goal_id: resolve(r)?,
                        new_amount: *amount,
                    })
                })
                .collect::<Result<_>>()?,
        },
        resume_date: args.resume,
        acknowledged: false,
    };

    // Validates paused ⊆ affected and surfaces any dangling references
    // before the event lands in the plan.
    let overrides = rebalance_for_flex_event(&event, &snapshot.goals)?;
    for warning in &overrides.warnings {
        tracing::warn!(%warning, "skipped dangling reference");
    }

    let id = event.id.clone();
    store.add_flex_event(event)?;
    println!("Declared flex event {id}");
    Ok(())
}
