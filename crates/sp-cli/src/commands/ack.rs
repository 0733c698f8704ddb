//! Ack command: acknowledge one goal-month deviation.

use anyhow::Result;
use sp_core::Month;

use crate::commands::util::resolve_goal;
use crate::store::PlanStore;

pub fn run(store: &PlanStore, goal: &str, year: i32, month: u32) -> Result<()> {
    let snapshot = store.load()?;
    let month = Month::new(year, month)?;
    let goal_id = resolve_goal(&snapshot, goal)?.id.clone();

    store.acknowledge_deviation(goal_id.clone(), month)?;
    println!("Acknowledged {goal_id} for {month}");
    Ok(())
}
