//! Savings goals - named targets with a deadline and priority.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::timeline;
use crate::types::{GoalId, PriorityWeight, ValidationError};

/// A named savings target.
///
/// `current_amount` is an aggregate: it equals the sum of allocation
/// transactions recorded against the goal, and only the host mutates it
/// (together with the transaction log, in one write). The engine reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    /// Unique identifier.
    pub id: GoalId,

    /// Human-readable name.
    pub name: String,

    /// Amount to save. Must be positive.
    pub target_amount: f64,

    /// When contributions begin. `None` means "today" at evaluation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// When the target must be reached. Must be after the effective start.
    pub deadline: NaiveDate,

    /// Funding priority; higher weights are funded first.
    #[serde(default)]
    pub priority: PriorityWeight,

    /// Declared fixed monthly contribution, if the user pinned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_contribution: Option<f64>,

    /// Amount saved so far.
    #[serde(default)]
    pub current_amount: f64,

    /// Marks the goal as the emergency fund.
    #[serde(default)]
    pub is_emergency_fund: bool,
}

impl Goal {
    /// Validates the goal's fields as of `today`.
    ///
    /// Runs before any calculation; a malformed goal never reaches the
    /// allocator or detectors.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "goal name" });
        }
        if self.target_amount <= 0.0 {
            return Err(ValidationError::NonPositiveTarget {
                value: self.target_amount,
            });
        }
        if self.current_amount < 0.0 {
            return Err(ValidationError::NegativeAmount {
                field: "current amount",
                value: self.current_amount,
            });
        }
        if let Some(contribution) = self.monthly_contribution {
            if contribution < 0.0 {
                return Err(ValidationError::NegativeAmount {
                    field: "monthly contribution",
                    value: contribution,
                });
            }
        }
        let start = timeline::effective_start(self.start_date, today);
        if self.deadline <= start {
            return Err(ValidationError::DeadlineBeforeStart {
                start,
                deadline: self.deadline,
            });
        }
        Ok(())
    }

    /// Declared monthly contribution, treating "not declared" as zero.
    pub fn declared_contribution(&self) -> f64 {
        self.monthly_contribution.unwrap_or(0.0)
    }

    /// Amount still needed to reach the target. Negative when overfunded.
    pub fn remaining_target(&self) -> f64 {
        self.target_amount - self.current_amount
    }

    /// Whether this goal is the emergency fund.
    ///
    /// The explicit flag is primary; the name substring is a compatibility
    /// shim for data predating the flag.
    pub fn is_emergency(&self) -> bool {
        self.is_emergency_fund || self.name.to_lowercase().contains("emergency")
    }

    /// Whether the goal has started as of `today`.
    pub fn has_started(&self, today: NaiveDate) -> bool {
        timeline::has_started(self.start_date, today)
    }
}
