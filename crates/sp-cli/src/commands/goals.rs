//! Goal commands: add and list.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sp_core::{Goal, GoalId, PriorityWeight, contribution_schedule};
use uuid::Uuid;

use crate::commands::util::{format_money, progress_bar};
use crate::store::PlanStore;

pub struct AddArgs {
    pub name: String,
    pub target: f64,
    pub deadline: NaiveDate,
    pub start: Option<NaiveDate>,
    pub priority: u8,
    pub monthly: Option<f64>,
    pub emergency: bool,
}

pub fn add(store: &PlanStore, args: AddArgs, today: NaiveDate) -> Result<()> {
    let goal = Goal {
        id: GoalId::new(Uuid::new_v4().to_string()).context("generated goal ID was invalid")?,
        name: args.name,
        target_amount: args.target,
        start_date: args.start,
        deadline: args.deadline,
        priority: PriorityWeight::new(args.priority)?,
        monthly_contribution: args.monthly,
        current_amount: 0.0,
        is_emergency_fund: args.emergency,
    };
    // Reject malformed goals before they reach the plan.
    goal.validate(today)?;

    let id = goal.id.clone();
    store.upsert_goal(goal)?;
    println!("Added goal {id}");
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, store: &PlanStore, today: NaiveDate, json: bool) -> Result<()> {
    let snapshot = store.load()?;

    if json {
        let schedules: Vec<_> = snapshot
            .goals
            .iter()
            .map(|goal| {
                serde_json::json!({
                    "goal": goal,
                    "schedule": contribution_schedule(goal, today),
                })
            })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&schedules)?)?;
        return Ok(());
    }

    if snapshot.goals.is_empty() {
        writeln!(writer, "No goals yet.")?;
        return Ok(());
    }

    for goal in &snapshot.goals {
        let schedule = contribution_schedule(goal, today);
        let saved = progress_bar(goal.current_amount, goal.target_amount);
        let status = if schedule.has_started { "" } else { "  (not started)" };
        writeln!(
            writer,
            "{} {}  {} / {}{}",
            saved,
            goal.name,
            format_money(goal.current_amount),
            format_money(goal.target_amount),
            status,
        )?;
        writeln!(
            writer,
            "    id {}  priority {}  deadline {}  required/month {}",
            goal.id,
            goal.priority,
            goal.deadline,
            format_money(schedule.required_monthly),
        )?;
    }
    Ok(())
}
