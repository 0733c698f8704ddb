//! Health command: one composite status for the whole plan.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use sp_core::{
    Deviation, Month, PlanHealth, calculate_auto_split, calculate_plan_health, detect_deviations,
    health::DEVIATION_WINDOW_MONTHS,
};

use crate::store::PlanStore;

pub struct HealthArgs {
    pub income: Option<f64>,
    pub scenario: Option<String>,
    pub json: bool,
}

pub fn run<W: Write>(
    writer: &mut W,
    store: &PlanStore,
    args: HealthArgs,
    today: NaiveDate,
) -> Result<()> {
    let snapshot = store.load()?;

    // Trailing window: the current month and the ones before it.
    let mut month = Month::of(today);
    let mut deviations: Vec<Deviation> = Vec::new();
    for _ in 0..DEVIATION_WINDOW_MONTHS {
        deviations.extend(detect_deviations(
            month,
            &snapshot.goals,
            &snapshot.transactions,
            &snapshot.acknowledged,
        ));
        month = previous(month)?;
    }

    // The efficiency figure needs an income run; without one it reads 0.
    let split = match args.income {
        Some(income) => {
            let scenario = args
                .scenario
                .as_deref()
                .and_then(|name| snapshot.scenario_named(name));
            Some(calculate_auto_split(
                income,
                scenario,
                &snapshot.goals,
                today,
            ))
        }
        None => None,
    };

    let health = calculate_plan_health(
        &snapshot.goals,
        &snapshot.transactions,
        &deviations,
        split.as_ref(),
        today,
    );

    render(writer, &health, args.json)
}

fn previous(month: Month) -> Result<Month> {
    let (year, number) = if month.month() == 1 {
        (month.year() - 1, 12)
    } else {
        (month.year(), month.month() - 1)
    };
    Ok(Month::new(year, number)?)
}

fn render<W: Write>(writer: &mut W, health: &PlanHealth, json: bool) -> Result<()> {
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(health)?)?;
        return Ok(());
    }

    writeln!(writer, "Plan health: {}", health.status)?;
    writeln!(
        writer,
        "Fragility {:.0}/100  efficiency {:.0}%",
        health.fragility_score, health.allocation_efficiency,
    )?;
    match health.slack_months {
        Some(slack) => writeln!(writer, "Tightest goal slack: {slack} month(s)")?,
        None => writeln!(writer, "No started goals.")?,
    }
    writeln!(
        writer,
        "On track {}  behind {}  open deviations {}",
        health.on_track_goals, health.behind_goals, health.deviation_count,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::{Goal, GoalId, HealthStatus, PriorityWeight};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn previous_wraps_the_year() {
        let january = Month::new(2025, 1).unwrap();
        assert_eq!(previous(january).unwrap(), Month::new(2024, 12).unwrap());
    }

    #[test]
    fn health_counts_trailing_deviations() {
        let temp = tempfile::tempdir().unwrap();
        let store = PlanStore::new(temp.path().join("plan.json"));
        store.init().unwrap();
        store
            .upsert_goal(Goal {
                id: GoalId::new("goal-1").unwrap(),
                name: "House".to_string(),
                target_amount: 120_000.0,
                start_date: Some(date(2025, 1, 1)),
                deadline: date(2025, 12, 27),
                priority: PriorityWeight::default(),
                monthly_contribution: Some(10_000.0),
                current_amount: 0.0,
                is_emergency_fund: false,
            })
            .unwrap();

        let mut out = Vec::new();
        run(
            &mut out,
            &store,
            HealthArgs {
                income: None,
                scenario: None,
                json: true,
            },
            date(2025, 4, 15),
        )
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        // February, March, and April all missed their contributions.
        assert_eq!(parsed["deviation_count"], 3);
        assert_eq!(parsed["status"], HealthStatus::Critical.as_str());
    }
}
