//! Shared utilities for CLI commands.

use anyhow::bail;
use sp_core::{Goal, PlanSnapshot};

/// Formats an amount with two decimals and thousands separators.
pub fn format_money(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cents = cents as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{fraction:02}")
}

/// Generates a 10-character progress bar.
/// Values below 5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = (value / max).clamp(0.0, 1.0);
    let filled = if ratio < 0.05 && value > 0.0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Resolves a goal by ID, falling back to a case-insensitive name match.
pub fn resolve_goal<'a>(snapshot: &'a PlanSnapshot, reference: &str) -> anyhow::Result<&'a Goal> {
    if let Some(goal) = snapshot.goals.iter().find(|g| g.id.as_str() == reference) {
        return Ok(goal);
    }
    if let Some(goal) = snapshot
        .goals
        .iter()
        .find(|g| g.name.eq_ignore_ascii_case(reference))
    {
        return Ok(goal);
    }
    bail!("no goal matches {reference:?} (by ID or name)");
}
