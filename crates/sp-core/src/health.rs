//! Aggregates efficiency, fragility, slack, and deviation signals into one
//! plan-health snapshot.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::autosplit::AutoSplitResult;
use crate::contribution;
use crate::deviation::Deviation;
use crate::goal::Goal;
use crate::timeline::{self, Month};
use crate::transaction::{self, Transaction};

/// Fragility at or above this is critical.
pub const FRAGILITY_CRITICAL: f64 = 60.0;

/// Fragility at or above this is a warning.
pub const FRAGILITY_WARNING: f64 = 30.0;

/// Fragility weight of the zero-slack goal fraction.
pub const WEIGHT_ZERO_SLACK: f64 = 40.0;

/// Fragility weight of reliance on the flexible share.
pub const WEIGHT_FLEX_RELIANCE: f64 = 25.0;

/// Fragility weight of recent deviation frequency.
pub const WEIGHT_DEVIATION_RATE: f64 = 35.0;

/// Months of trailing deviations the scorer expects as input.
pub const DEVIATION_WINDOW_MONTHS: u32 = 3;

/// Overall plan status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A snapshot summary of the whole plan, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanHealth {
    /// Share of net income the latest split handed to goals, in percent.
    pub allocation_efficiency: f64,
    /// Composite risk indicator, 0–100, higher is worse.
    pub fragility_score: f64,
    /// Months of headroom for the goal with the least of it. Negative when
    /// that goal is behind schedule; `None` without started goals.
    pub slack_months: Option<i64>,
    /// Unacknowledged deviations in the trailing window.
    pub deviation_count: usize,
    /// Started goals meeting their required monthly this month.
    pub on_track_goals: usize,
    /// Started goals falling short this month.
    pub behind_goals: usize,
    /// Overall status derived from the policy thresholds.
    pub status: HealthStatus,
}

/// Signed slack for one goal: months of headroom between the installments
/// the deadline still allows and the installments the declared contribution
/// needs. Zero when no contribution is declared.
#[allow(clippy::cast_possible_truncation)]
pub fn slack_months(goal: &Goal, today: NaiveDate) -> i64 {
    let declared = goal.declared_contribution();
    if declared <= 0.0 {
        return 0;
    }
    let available = i64::from(timeline::months_remaining(today, goal.deadline));
    let needed = (goal.remaining_target().max(0.0) / declared).ceil() as i64;
    available - needed
}

/// Computes the plan-health snapshot.
///
/// `deviations` is expected to cover the trailing [`DEVIATION_WINDOW_MONTHS`]
/// months; `latest_split` supplies the efficiency figure (no income data
/// means efficiency 0).
pub fn calculate_plan_health(
    goals: &[Goal],
    transactions: &[Transaction],
    deviations: &[Deviation],
    latest_split: Option<&AutoSplitResult>,
    today: NaiveDate,
) -> PlanHealth {
    let allocation_efficiency = latest_split.map_or(0.0, |split| {
        if split.net_income > 0.0 {
            split.total_allocated / split.net_income * 100.0
        } else {
            0.0
        }
    });

    let started: Vec<&Goal> = goals.iter().filter(|g| g.has_started(today)).collect();

    let this_month = Month::of(today);
    let mut on_track_goals = 0;
    let mut behind_goals = 0;
    for goal in &started {
        let required = contribution::planned_for_month(goal, this_month, transactions);
        let actual = transaction::allocated_in_month(&goal.id, this_month, transactions);
        if actual >= required {
            on_track_goals += 1;
        } else {
            behind_goals += 1;
        }
    }

    let slack = started.iter().map(|g| slack_months(g, today)).min();
    let deviation_count = deviations.iter().filter(|d| !d.acknowledged).count();
    let fragility_score = fragility(&started, deviation_count, today);

    let status = if fragility_score >= FRAGILITY_CRITICAL || behind_goals > on_track_goals {
        HealthStatus::Critical
    } else if fragility_score >= FRAGILITY_WARNING || deviation_count > 0 {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    };

    PlanHealth {
        allocation_efficiency,
        fragility_score,
        slack_months: slack,
        deviation_count,
        on_track_goals,
        behind_goals,
        status,
    }
}

/// Weighted fragility score, 0–100.
///
/// Monotonic in each input: more deviations never lower it, more slack
/// never raises it.
#[allow(clippy::cast_precision_loss)]
fn fragility(started: &[&Goal], deviation_count: usize, today: NaiveDate) -> f64 {
    if started.is_empty() {
        return 0.0;
    }
    let count = started.len() as f64;
    let zero_slack = started
        .iter()
        .filter(|g| slack_months(g, today) <= 0)
        .count() as f64
        / count;
    let flex_reliance = started
        .iter()
        .filter(|g| g.declared_contribution() <= 0.0)
        .count() as f64
        / count;
    let deviation_rate =
        (deviation_count as f64 / (count * f64::from(DEVIATION_WINDOW_MONTHS))).min(1.0);

    (WEIGHT_ZERO_SLACK * zero_slack
        + WEIGHT_FLEX_RELIANCE * flex_reliance
        + WEIGHT_DEVIATION_RATE * deviation_rate)
        .clamp(0.0, 100.0)
}
