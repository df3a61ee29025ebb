//! Date range and reporting month types.
//!
//! This module contains the [`DateRange`] closed interval used by every
//! report query and the [`ReportMonth`] value that the query surface accepts
//! in `YYYY-MM` form.

use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};

/// A closed interval of calendar days, `start..=end`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
/// ).unwrap();
///
/// assert!(range.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())); // start date
/// assert!(range.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())); // end date
/// assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())); // after
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// The first day of the range (inclusive).
    pub start: NaiveDate,
    /// The last day of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, failing with `InvalidRange` if `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Checks if a given date falls within this range (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Iterates every day of the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }
}

/// A calendar month, written `YYYY-MM`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::ReportMonth;
/// use chrono::NaiveDate;
///
/// let month: ReportMonth = "2024-02".parse().unwrap();
/// let range = month.range();
/// assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert_eq!(month.to_string(), "2024-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportMonth {
    first_day: NaiveDate,
}

impl ReportMonth {
    /// Creates a month from a year and a 1-based month number.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| {
                EngineError::validation(
                    "month",
                    format!("{}-{:02} is not a valid month", year, month),
                )
            })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The current month (UTC).
    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    /// Parses an optional query parameter, defaulting to the current month.
    pub fn parse_or_current(value: Option<&str>) -> EngineResult<Self> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => value.parse(),
            None => Ok(Self::current()),
        }
    }

    /// The year.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The 1-based month number.
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// The full calendar span of the month.
    pub fn range(&self) -> DateRange {
        let last_day = self
            .first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.first_day);
        DateRange {
            start: self.first_day,
            end: last_day,
        }
    }
}

impl FromStr for ReportMonth {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::validation("month", format!("expected YYYY-MM, got '{}'", s));

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl Serialize for ReportMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReportMonth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
