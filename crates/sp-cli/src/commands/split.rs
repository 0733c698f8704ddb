//! Split command: divide an income figure across goals.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sp_core::{
    AllocationKind, AutoSplitResult, calculate_auto_split, apply_overrides,
    rebalance_for_flex_event,
};

use crate::commands::util::{format_money, progress_bar};
use crate::store::PlanStore;

pub struct SplitArgs {
    pub income: f64,
    pub scenario: Option<String>,
    pub no_flex: bool,
    pub json: bool,
}

pub fn run<W: Write>(
    writer: &mut W,
    store: &PlanStore,
    args: SplitArgs,
    today: NaiveDate,
) -> Result<()> {
    let snapshot = store.load()?;

    for warning in snapshot.dangling_references() {
        tracing::warn!(%warning, "ignoring dangling reference");
    }

    for goal in &snapshot.goals {
        goal.validate(today)
            .with_context(|| format!("goal {} is malformed", goal.id))?;
    }

    let scenario = match &args.scenario {
        Some(name) => Some(
            snapshot
                .scenario_named(name)
                .ok_or_else(|| anyhow::anyhow!("no scenario named {name:?}"))?,
        ),
        None => None,
    };

    let mut result = calculate_auto_split(args.income, scenario, &snapshot.goals, today);

    // Active flex events reshape the forward allocation.
    if !args.no_flex {
        for event in snapshot
            .flex_events
            .iter()
            .filter(|event| event.is_active_on(today))
        {
            let overrides = rebalance_for_flex_event(event, &snapshot.goals)?;
            for warning in &overrides.warnings {
                tracing::warn!(%warning, "skipped dangling reference");
            }
            result = apply_overrides(&result, &overrides);
        }
    }

    render(writer, &result, args.json)
}

fn render<W: Write>(writer: &mut W, result: &AutoSplitResult, json: bool) -> Result<()> {
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(result)?)?;
        return Ok(());
    }

    if result.net_income <= 0.0 {
        writeln!(
            writer,
            "Net income {} leaves nothing to allocate.",
            format_money(result.net_income)
        )?;
        return Ok(());
    }

    writeln!(
        writer,
        "Net income {} (gross {})",
        format_money(result.net_income),
        format_money(result.gross_income),
    )?;

    for allocation in &result.allocations {
        let tag = match allocation.kind {
            AllocationKind::Emergency => " [emergency]",
            AllocationKind::Goal => "",
        };
        let future = if allocation.future { " (not started)" } else { "" };
        writeln!(
            writer,
            "{} {:>12}  {}{}{}",
            progress_bar(allocation.amount, result.net_income),
            format_money(allocation.amount),
            allocation.goal_name,
            tag,
            future,
        )?;
    }

    writeln!(
        writer,
        "Allocated {}  free to spend {}",
        format_money(result.total_allocated),
        format_money(result.free_spend),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::{Goal, GoalId, PriorityWeight};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(id: &str, priority: u8, monthly: Option<f64>) -> Goal {
        Goal {
            id: GoalId::new(id).unwrap(),
            name: id.to_string(),
            target_amount: 60_000.0,
            start_date: Some(date(2025, 1, 1)),
            deadline: date(2026, 1, 1),
            priority: PriorityWeight::new(priority).unwrap(),
            monthly_contribution: monthly,
            current_amount: 0.0,
            is_emergency_fund: false,
        }
    }

    fn store_with(goals: Vec<Goal>) -> (tempfile::TempDir, PlanStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = PlanStore::new(temp.path().join("plan.json"));
        store.init().unwrap();
        for g in goals {
            store.upsert_goal(g).unwrap();
        }
        (temp, store)
    }

    #[test]
    fn split_renders_allocations_and_free_spend() {
        let (_temp, store) = store_with(vec![goal("goal-a", 8, None), goal("goal-b", 2, None)]);
        let mut out = Vec::new();
        run(
            &mut out,
            &store,
            SplitArgs {
                income: 10_000.0,
                scenario: None,
                no_flex: false,
                json: false,
            },
            date(2025, 6, 1),
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("4,000.00"));
        assert!(text.contains("3,000.00"));
        assert!(text.contains("free to spend 3,000.00"));
    }

    #[test]
    fn split_json_output_is_parseable() {
        let (_temp, store) = store_with(vec![goal("goal-a", 8, Some(2_000.0))]);
        let mut out = Vec::new();
        run(
            &mut out,
            &store,
            SplitArgs {
                income: 10_000.0,
                scenario: None,
                no_flex: false,
                json: true,
            },
            date(2025, 6, 1),
        )
        .unwrap();

        let parsed: AutoSplitResult = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.total_allocated, 2_000.0);
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        let (_temp, store) = store_with(vec![]);
        let mut out = Vec::new();
        let result = run(
            &mut out,
            &store,
            SplitArgs {
                income: 10_000.0,
                scenario: Some("missing".to_string()),
                no_flex: false,
                json: false,
            },
            date(2025, 6, 1),
        );
        assert!(result.is_err());
    }
}
