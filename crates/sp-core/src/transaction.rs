//! Transactions - the append-only money log.
//!
//! A goal's `current_amount` equals the sum of allocation transactions
//! recorded against it. The helpers here aggregate that log read-only, so
//! recomputing any number of times never double counts.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::timeline::Month;
use crate::types::{CategoryId, GoalId, TransactionId, ValidationError};

/// The kind of money movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in. Carries no goal.
    Income,
    /// Money going out, optionally categorized.
    Expense,
    /// A credit against a goal's saved amount.
    Allocation,
}

impl TransactionKind {
    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Allocation => "allocation",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "allocation" => Ok(Self::Allocation),
            _ => Err(ValidationError::InvalidKind {
                field: "transaction type",
                value: s.to_string(),
            }),
        }
    }
}

/// Classification of a planned-versus-actual gap.
///
/// The detector derives the two contribution kinds; `Overspend` and
/// `IncomeDrop` are recorded on transactions by the host and flow through
/// the same acknowledgement path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationKind {
    /// No contribution at all in a month that required one.
    MissedContribution,
    /// A contribution smaller than required.
    UnderContribution,
    /// Spending exceeded the plan.
    Overspend,
    /// Income came in below the scenario.
    IncomeDrop,
}

impl DeviationKind {
    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissedContribution => "missed_contribution",
            Self::UnderContribution => "under_contribution",
            Self::Overspend => "overspend",
            Self::IncomeDrop => "income_drop",
        }
    }
}

impl fmt::Display for DeviationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single recorded money movement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,

    /// The goal this allocation credits. `None` for pure income/expense.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<GoalId>,

    /// Spending category, expenses only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    /// Amount moved.
    pub amount: f64,

    /// What kind of movement this is.
    pub kind: TransactionKind,

    /// When the movement happened.
    pub date: NaiveDate,

    /// Deviation classification recorded by the host, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<DeviationKind>,

    /// Planned amount at recording time, for deviation bookkeeping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_amount: Option<f64>,

    /// Actual amount at recording time, for deviation bookkeeping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_amount: Option<f64>,

    /// Whether the recorded deviation was acknowledged.
    #[serde(default)]
    pub acknowledged: bool,

    /// When the deviation was acknowledged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<NaiveDate>,
}

/// Sum of allocation transactions recorded against `goal_id`, over the whole
/// log.
pub fn allocated_total(goal_id: &GoalId, transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Allocation)
        .filter(|tx| tx.goal_id.as_ref() == Some(goal_id))
        .map(|tx| tx.amount)
        .sum()
}

/// Sum of allocation transactions for `goal_id` dated inside `month`.
pub fn allocated_in_month(goal_id: &GoalId, month: Month, transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Allocation)
        .filter(|tx| tx.goal_id.as_ref() == Some(goal_id))
        .filter(|tx| month.contains(tx.date))
        .map(|tx| tx.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn allocation(id: &str, goal: &str, amount: f64, when: NaiveDate) -> Transaction {
        Transaction {
            id: TransactionId::new(id).unwrap(),
            goal_id: Some(GoalId::new(goal).unwrap()),
            category_id: None,
            amount,
            kind: TransactionKind::Allocation,
            date: when,
            deviation: None,
            planned_amount: None,
            actual_amount: None,
            acknowledged: false,
            acknowledged_at: None,
        }
    }

    #[test]
    fn allocated_total_sums_only_matching_allocations() {
        let goal = GoalId::new("goal-1").unwrap();
        let mut other = allocation("tx-3", "goal-2", 500.0, date(2025, 1, 10));
        other.kind = TransactionKind::Allocation;
        let mut income = allocation("tx-4", "goal-1", 900.0, date(2025, 1, 11));
        income.kind = TransactionKind::Income;

        let log = vec![
            allocation("tx-1", "goal-1", 100.0, date(2025, 1, 5)),
            allocation("tx-2", "goal-1", 250.0, date(2025, 2, 5)),
            other,
            income,
        ];

        assert_eq!(allocated_total(&goal, &log), 350.0);
    }

    #[test]
    fn allocated_total_is_idempotent() {
        let goal = GoalId::new("goal-1").unwrap();
        let log = vec![allocation("tx-1", "goal-1", 100.0, date(2025, 1, 5))];
        // Re-running the aggregation never double counts.
        assert_eq!(allocated_total(&goal, &log), 100.0);
        assert_eq!(allocated_total(&goal, &log), 100.0);
    }

    #[test]
    fn allocated_in_month_respects_bounds() {
        let goal = GoalId::new("goal-1").unwrap();
        let log = vec![
            allocation("tx-1", "goal-1", 100.0, date(2025, 1, 1)),
            allocation("tx-2", "goal-1", 200.0, date(2025, 1, 31)),
            allocation("tx-3", "goal-1", 400.0, date(2025, 2, 1)),
        ];

        let january = Month::new(2025, 1).unwrap();
        assert_eq!(allocated_in_month(&goal, january, &log), 300.0);
    }

    #[test]
    fn kind_from_str() {
        assert_eq!(
            "allocation".parse::<TransactionKind>().unwrap(),
            TransactionKind::Allocation
        );
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn transaction_serde_roundtrip() {
        let tx = allocation("tx-1", "goal-1", 100.0, date(2025, 1, 5));
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("\"allocation\""));
        let parsed: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tx);
    }

    #[test]
    fn deviation_kind_strings_are_snake_case() {
        assert_eq!(
            DeviationKind::MissedContribution.as_str(),
            "missed_contribution"
        );
        assert_eq!(
            serde_json::to_string(&DeviationKind::IncomeDrop).unwrap(),
            "\"income_drop\""
        );
    }
}
