//! Deviations command: planned-versus-actual gaps for one month.

use std::io::Write;

use anyhow::Result;
use sp_core::{Deviation, Month, detect_deviations};

use crate::commands::util::format_money;
use crate::store::PlanStore;

pub fn run<W: Write>(
    writer: &mut W,
    store: &PlanStore,
    year: i32,
    month: u32,
    json: bool,
) -> Result<()> {
    let snapshot = store.load()?;
    let month = Month::new(year, month)?;

    let deviations = detect_deviations(
        month,
        &snapshot.goals,
        &snapshot.transactions,
        &snapshot.acknowledged,
    );

    render(writer, month, &deviations, &snapshot, json)
}

fn render<W: Write>(
    writer: &mut W,
    month: Month,
    deviations: &[Deviation],
    snapshot: &sp_core::PlanSnapshot,
    json: bool,
) -> Result<()> {
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(deviations)?)?;
        return Ok(());
    }

    if deviations.is_empty() {
        writeln!(writer, "No deviations in {month}.")?;
        return Ok(());
    }

    for deviation in deviations {
        let name = snapshot
            .goal(&deviation.goal_id)
            .map_or_else(|| deviation.goal_id.to_string(), |g| g.name.clone());
        let ack = if deviation.acknowledged {
            "  (acknowledged)"
        } else {
            ""
        };
        writeln!(
            writer,
            "{name}: {} (planned {}, actual {}, short {}){}",
            deviation.kind,
            format_money(deviation.planned),
            format_money(deviation.actual),
            format_money(deviation.shortfall),
            ack,
        )?;
    }
    Ok(())
}
