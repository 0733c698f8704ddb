//! Planned-versus-actual contribution analysis per goal and month.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::contribution;
use crate::goal::Goal;
use crate::timeline::Month;
use crate::transaction::{self, DeviationKind, Transaction};
use crate::types::GoalId;

/// A gap between planned and actual monthly contribution for one goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deviation {
    /// The goal that fell short.
    pub goal_id: GoalId,
    /// The month the gap occurred in.
    #[serde(flatten)]
    pub month: Month,
    /// Classification of the gap.
    pub kind: DeviationKind,
    /// Required monthly contribution, computed as of that month.
    pub planned: f64,
    /// Allocation transactions actually recorded inside the month.
    pub actual: f64,
    /// `max(0, planned - actual)`.
    pub shortfall: f64,
    /// Whether the user has acknowledged this goal-month.
    pub acknowledged: bool,
}

/// Acknowledged deviations, keyed by goal and month.
///
/// The engine never persists this; the host stores it and hands it back in
/// with every snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcknowledgedDeviations(BTreeSet<(GoalId, Month)>);

impl AcknowledgedDeviations {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the given goal-month was acknowledged.
    pub fn contains(&self, goal_id: &GoalId, month: Month) -> bool {
        self.0.contains(&(goal_id.clone(), month))
    }

    /// Returns a new set with the goal-month acknowledged.
    ///
    /// Pure and idempotent: the receiver is untouched, acknowledging twice
    /// is the same as acknowledging once, and the scope is exactly one
    /// goal-month.
    #[must_use]
    pub fn acknowledge(&self, goal_id: GoalId, month: Month) -> Self {
        let mut set = self.0.clone();
        set.insert((goal_id, month));
        Self(set)
    }

    /// Number of acknowledged goal-months.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was acknowledged yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Detects contribution deviations for one calendar month.
///
/// Pure over (goals, transactions, month): acknowledging changes only the
/// `acknowledged` flag on re-detection, never the classification or the
/// shortfall.
pub fn detect_deviations(
    month: Month,
    goals: &[Goal],
    transactions: &[Transaction],
    acknowledged: &AcknowledgedDeviations,
) -> Vec<Deviation> {
    goals
        .iter()
        .filter_map(|goal| {
            // A goal participates in a month once its effective start is on
            // or before the month's last day.
            if !goal.has_started(month.last_day()) {
                return None;
            }
            let planned = contribution::planned_for_month(goal, month, transactions);
            if planned <= 0.0 {
                return None;
            }
            let actual = transaction::allocated_in_month(&goal.id, month, transactions);
            if actual >= planned {
                return None;
            }
            let kind = if actual <= 0.0 {
                DeviationKind::MissedContribution
            } else {
                DeviationKind::UnderContribution
            };
            Some(Deviation {
                goal_id: goal.id.clone(),
                month,
                kind,
                planned,
                actual,
                shortfall: planned - actual,
                acknowledged: acknowledged.contains(&goal.id, month),
            })
        })
        .collect()
}
