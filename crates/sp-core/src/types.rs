//! Core type definitions with validation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for engine inputs.
///
/// Malformed inputs are rejected before any calculation runs; the message is
/// surfaced verbatim to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The priority weight was out of range.
    #[error("priority weight must be between 1 and 10, got {value}")]
    PriorityOutOfRange { value: u8 },

    /// The target amount was zero or negative.
    #[error("target amount must be positive, got {value}")]
    NonPositiveTarget { value: f64 },

    /// The deadline was on or before the start date.
    #[error("deadline {deadline} is not after start date {start}")]
    DeadlineBeforeStart {
        start: NaiveDate,
        deadline: NaiveDate,
    },

    /// A money field that must be non-negative was negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: f64 },

    /// The tax rate was outside 0–100.
    #[error("tax rate must be between 0 and 100, got {value}")]
    TaxRateOutOfRange { value: f64 },

    /// Invalid string value for an enum-like field.
    #[error("invalid {field}: {value}")]
    InvalidKind { field: &'static str, value: String },

    /// The calendar month was outside 1–12.
    #[error("month must be between 1 and 12, got {value}")]
    MonthOutOfRange { value: u32 },

    /// The calendar year was outside the supported range.
    #[error("year {value} is outside the supported range")]
    YearOutOfRange { value: i32 },

    /// A flex event paused a goal that is not in its affected set.
    #[error("paused goal {goal_id} is not in the event's affected goals")]
    PausedGoalNotAffected { goal_id: String },
}

/// Errors from engine entry points.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// An input record failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A computation was asked about a goal that is not in the supplied set.
    #[error("unknown goal: {0}")]
    UnknownGoal(GoalId),
}

/// Non-fatal report of a dangling reference the engine skipped.
///
/// Partial results remain useful, so a flex event or transaction that points
/// at a goal missing from the supplied set is ignored and reported here
/// instead of failing the whole computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineWarning {
    /// A flex event referenced a goal that does not exist.
    UnknownGoalInFlexEvent {
        event_id: FlexEventId,
        goal_id: GoalId,
    },
    /// A transaction referenced a goal that does not exist.
    UnknownGoalInTransaction {
        transaction_id: TransactionId,
        goal_id: GoalId,
    },
}

impl fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGoalInFlexEvent { event_id, goal_id } => {
                write!(f, "flex event {event_id} references unknown goal {goal_id}")
            }
            Self::UnknownGoalInTransaction {
                transaction_id,
                goal_id,
            } => {
                write!(
                    f,
                    "transaction {transaction_id} references unknown goal {goal_id}"
                )
            }
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated goal identifier.
    ///
    /// Goal IDs must be non-empty strings. The engine treats them as opaque;
    /// the host decides how they are generated.
    GoalId, "goal ID"
);

define_string_id!(
    /// A validated income-scenario identifier.
    ScenarioId, "scenario ID"
);

define_string_id!(
    /// A validated transaction identifier.
    TransactionId, "transaction ID"
);

define_string_id!(
    /// A validated spending-category identifier.
    ///
    /// Only expense transactions carry a category.
    CategoryId, "category ID"
);

define_string_id!(
    /// A validated flex-event identifier.
    FlexEventId, "flex event ID"
);

/// A goal's priority weight in the range \[1, 10\].
///
/// Higher weights are funded first. Values are clamped during
/// deserialization to be lenient with external data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriorityWeight(u8);

impl PriorityWeight {
    /// The highest priority (10).
    pub const MAX: Self = Self(10);

    /// The lowest priority (1).
    pub const MIN: Self = Self(1);

    /// Creates a new priority weight after validation.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (1..=10).contains(&value) {
            return Ok(Self(value));
        }
        Err(ValidationError::PriorityOutOfRange { value })
    }

    /// Creates a priority weight, clamping to \[1, 10\].
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value < 1 {
            Self(1)
        } else if value > 10 {
            Self(10)
        } else {
            Self(value)
        }
    }

    /// Returns the inner weight.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for PriorityWeight {
    fn default() -> Self {
        Self(5)
    }
}

impl fmt::Display for PriorityWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for PriorityWeight {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PriorityWeight> for u8 {
    fn from(weight: PriorityWeight) -> Self {
        weight.0
    }
}

impl Serialize for PriorityWeight {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PriorityWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        // Clamp on deserialization to be lenient with external data
        Ok(Self::clamped(value))
    }
}
