//! Date and clock-time arithmetic.
//!
//! This module provides the inclusive day span used for leave durations,
//! the lateness and overtime windows used for attendance, and the
//! working-day count used as the attendance-rate denominator.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{EngineError, EngineResult};
use crate::models::DateRange;

/// Default standard shift length in hours.
pub const DEFAULT_STANDARD_HOURS: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Default expected clock-in time (09:00).
pub fn default_expected_clock_in() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Counts the days between two dates, including both endpoints.
///
/// # Errors
///
/// Returns `InvalidRange` if `end` is before `start`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::inclusive_day_span;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(inclusive_day_span(start, end).unwrap(), 5);
/// assert_eq!(inclusive_day_span(start, start).unwrap(), 1);
/// assert!(inclusive_day_span(end, start).is_err());
/// ```
pub fn inclusive_day_span(start: NaiveDate, end: NaiveDate) -> EngineResult<i64> {
    if end < start {
        return Err(EngineError::InvalidRange { start, end });
    }
    Ok((end - start).num_days() + 1)
}

/// Minutes by which `clock_in` is after `expected`.
///
/// Returns 0 when the employee did not clock in or arrived on time.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::lateness_minutes;
/// use chrono::NaiveTime;
///
/// let expected = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// let clock_in = NaiveTime::from_hms_opt(9, 15, 0);
/// assert_eq!(lateness_minutes(clock_in, expected), 15);
/// assert_eq!(lateness_minutes(None, expected), 0);
/// ```
pub fn lateness_minutes(clock_in: Option<NaiveTime>, expected: NaiveTime) -> i64 {
    match clock_in {
        Some(clock_in) => (clock_in - expected).num_minutes().max(0),
        None => 0,
    }
}

/// Minutes worked beyond `standard_hours` between clock-in and clock-out.
///
/// Returns 0 when either clock time is missing. Partial minutes of the
/// standard shift are rounded down in the employee's favour.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{overtime_minutes, DEFAULT_STANDARD_HOURS};
/// use chrono::NaiveTime;
///
/// let clock_in = NaiveTime::from_hms_opt(9, 0, 0);
/// let clock_out = NaiveTime::from_hms_opt(18, 30, 0);
/// assert_eq!(overtime_minutes(clock_in, clock_out, DEFAULT_STANDARD_HOURS), 90);
/// assert_eq!(overtime_minutes(clock_in, None, DEFAULT_STANDARD_HOURS), 0);
/// ```
pub fn overtime_minutes(
    clock_in: Option<NaiveTime>,
    clock_out: Option<NaiveTime>,
    standard_hours: Decimal,
) -> i64 {
    let (Some(clock_in), Some(clock_out)) = (clock_in, clock_out) else {
        return 0;
    };

    let worked_minutes = (clock_out - clock_in).num_minutes();
    let standard_minutes = (standard_hours * Decimal::from(60))
        .floor()
        .to_i64()
        .unwrap_or(i64::MAX);

    worked_minutes.saturating_sub(standard_minutes).max(0)
}

/// Returns true for Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts the weekdays (Monday to Friday) in `range`, inclusive.
///
/// This is the single working-day definition used for every attendance
/// rate.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::working_days;
/// use payroll_engine::models::ReportMonth;
///
/// // March 2024 has 31 days, 10 of them on weekends
/// let march = ReportMonth::new(2024, 3).unwrap().range();
/// assert_eq!(working_days(&march), 21);
/// ```
pub fn working_days(range: &DateRange) -> i64 {
    range.days().filter(|day| !is_weekend(*day)).count() as i64
}
