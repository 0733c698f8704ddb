//! Income scenarios - gross-to-net assumptions for allocation runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{ScenarioId, ValidationError};

/// How optimistic a scenario's income assumptions are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Conservative,
    Expected,
    Optimistic,
}

impl ScenarioKind {
    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Expected => "expected",
            Self::Optimistic => "optimistic",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conservative" => Ok(Self::Conservative),
            "expected" => Ok(Self::Expected),
            "optimistic" => Ok(Self::Optimistic),
            _ => Err(ValidationError::InvalidKind {
                field: "scenario type",
                value: s.to_string(),
            }),
        }
    }
}

/// Income assumptions used to derive net income from a gross figure.
///
/// Pure input data: a calculation keeps the values it was handed, so editing
/// a scenario never retroactively changes historical results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeScenario {
    /// Unique identifier.
    pub id: ScenarioId,

    /// Human-readable name.
    pub name: String,

    /// Expected gross monthly income.
    pub monthly_income: f64,

    /// Tax rate in percent (0–100).
    pub tax_rate: f64,

    /// Fixed monthly expenses deducted after tax.
    #[serde(default)]
    pub fixed_expenses: f64,

    /// Optimism level.
    pub kind: ScenarioKind,
}

impl IncomeScenario {
    /// Validates the scenario's fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "scenario name",
            });
        }
        if !(0.0..=100.0).contains(&self.tax_rate) {
            return Err(ValidationError::TaxRateOutOfRange {
                value: self.tax_rate,
            });
        }
        if self.fixed_expenses < 0.0 {
            return Err(ValidationError::NegativeAmount {
                field: "fixed expenses",
                value: self.fixed_expenses,
            });
        }
        Ok(())
    }

    /// Net income available for allocation: gross after tax, minus fixed
    /// expenses. May be negative; the allocator decides how to clamp.
    pub fn net_income(&self, gross: f64) -> f64 {
        gross * (1.0 - self.tax_rate / 100.0) - self.fixed_expenses
    }
}
