//! Consequence command: project a shortfall's downstream effect.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use sp_core::{ConsequenceProjection, Month, calculate_consequence};

use crate::commands::util::{format_money, resolve_goal};
use crate::store::PlanStore;

pub struct ConsequenceArgs {
    pub goal: String,
    pub shortfall: f64,
    pub year: i32,
    pub month: u32,
    pub tolerance: f64,
    pub json: bool,
}

pub fn run<W: Write>(
    writer: &mut W,
    store: &PlanStore,
    args: ConsequenceArgs,
    today: NaiveDate,
) -> Result<()> {
    let snapshot = store.load()?;
    let month = Month::new(args.year, args.month)?;
    let goal_id = resolve_goal(&snapshot, &args.goal)?.id.clone();

    let projection = calculate_consequence(
        &goal_id,
        args.shortfall,
        month,
        &snapshot.goals,
        &snapshot.flex_events,
        today,
        args.tolerance,
    )?;

    render(writer, &projection, args.json)
}

fn render<W: Write>(writer: &mut W, projection: &ConsequenceProjection, json: bool) -> Result<()> {
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(projection)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Shortfall {} in {}",
        format_money(projection.shortfall),
        projection.month,
    )?;
    writeln!(
        writer,
        "Remaining {} over {} months: {} per month",
        format_money(projection.new_remaining),
        projection.months_remaining,
        format_money(projection.new_required_monthly),
    )?;

    if projection.can_catch_up {
        writeln!(writer, "The declared contribution absorbs this; no deadline shift.")?;
    } else {
        match (projection.deadline_shift_months, projection.projected_deadline) {
            (Some(shift), Some(deadline)) => {
                writeln!(
                    writer,
                    "Deadline slips {shift} month(s), to {deadline}."
                )?;
            }
            _ => writeln!(
                writer,
                "Unreachable at the current contribution; raise it or move the deadline."
            )?,
        }
    }

    if !projection.affected_goals.is_empty() {
        writeln!(writer, "Also affected:")?;
        for affected in &projection.affected_goals {
            writeln!(
                writer,
                "- {} ({:?})",
                affected.goal_name, affected.impact
            )?;
        }
    }
    Ok(())
}
