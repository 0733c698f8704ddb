//! Shared date and interval math.
//!
//! Every comparison in the engine is date-only; time of day is never
//! consulted. A "month" of schedule math is a 30-day installment, while
//! [`Month`] is a calendar month used to bucket transactions.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Days per installment when amortizing a target over its remaining window.
const DAYS_PER_INSTALLMENT: i64 = 30;

/// The date a goal's contributions begin: its declared start, or `today`
/// when no start was declared.
pub fn effective_start(start_date: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    start_date.unwrap_or(today)
}

/// Whether a goal has started as of `today`.
pub fn has_started(start_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    effective_start(start_date, today) <= today
}

/// Number of 30-day installments between `from` and `deadline`, rounded up
/// and floored at zero.
pub fn months_remaining(from: NaiveDate, deadline: NaiveDate) -> u32 {
    let days = (deadline - from).num_days();
    if days <= 0 {
        return 0;
    }
    u32::try_from((days as u64).div_ceil(DAYS_PER_INSTALLMENT as u64)).unwrap_or(u32::MAX)
}

/// A calendar month (validated year/month pair).
///
/// Used to bucket transactions and key deviation acknowledgements.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "MonthParts", into = "MonthParts")]
pub struct Month {
    year: i32,
    month: u32,
}

/// Raw serde representation of [`Month`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct MonthParts {
    year: i32,
    month: u32,
}

impl Month {
    /// Creates a month after validating the year and month.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::MonthOutOfRange { value: month });
        }
        if !(1..=9999).contains(&year) {
            return Err(ValidationError::YearOutOfRange { value: year });
        }
        Ok(Self { year, month })
    }

    /// The calendar month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Returns the month number (1–12).
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of this month.
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("year and month are validated at construction")
    }

    /// Last day of this month.
    pub fn last_day(self) -> NaiveDate {
        self.next().first_day() - Duration::days(1)
    }

    /// The following calendar month.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Whether `date` falls inside this month.
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<MonthParts> for Month {
    type Error = ValidationError;

    fn try_from(parts: MonthParts) -> Result<Self, Self::Error> {
        Self::new(parts.year, parts.month)
    }
}

impl From<Month> for MonthParts {
    fn from(month: Month) -> Self {
        Self {
            year: month.year,
            month: month.month,
        }
    }
}
