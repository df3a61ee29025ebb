//! Attendance model and related types.
//!
//! One [`AttendanceRecord`] exists per (employee, calendar date). Its
//! `late_minutes` and `overtime_minutes` are derived from the clock times
//! and status at write time and are never supplied directly.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RecordId;

/// The attendance outcome for one employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Worked the day.
    Present,
    /// Did not work and was not on leave.
    Absent,
    /// Worked the day but arrived late.
    Late,
    /// Worked part of the day.
    HalfDay,
    /// On approved leave.
    OnLeave,
}

impl AttendanceStatus {
    /// Every status, in reporting order.
    pub const ALL: [AttendanceStatus; 5] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
        AttendanceStatus::HalfDay,
        AttendanceStatus::OnLeave,
    ];

    /// Returns true for statuses where no work was done, so clock times
    /// are meaningless.
    pub fn is_off_duty(self) -> bool {
        match self {
            AttendanceStatus::Absent | AttendanceStatus::OnLeave => true,
            AttendanceStatus::Present | AttendanceStatus::Late | AttendanceStatus::HalfDay => {
                false
            }
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
            AttendanceStatus::Late => write!(f, "late"),
            AttendanceStatus::HalfDay => write!(f, "half_day"),
            AttendanceStatus::OnLeave => write!(f, "on_leave"),
        }
    }
}

/// A candidate attendance entry as submitted by a clerk or a clock terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    /// The employee the entry is for.
    pub employee_id: RecordId,
    /// The calendar day.
    pub date: NaiveDate,
    /// Clock-in time, if the employee clocked in.
    #[serde(default)]
    pub clock_in: Option<NaiveTime>,
    /// Clock-out time, if the employee clocked out.
    #[serde(default)]
    pub clock_out: Option<NaiveTime>,
    /// The attendance status.
    pub status: AttendanceStatus,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A persisted attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// The employee the record is for.
    pub employee_id: RecordId,
    /// The calendar day.
    pub date: NaiveDate,
    /// Clock-in time. Always `None` for off-duty statuses.
    pub clock_in: Option<NaiveTime>,
    /// Clock-out time. Always `None` for off-duty statuses.
    pub clock_out: Option<NaiveTime>,
    /// The attendance status.
    pub status: AttendanceStatus,
    /// Minutes after the expected clock-in time.
    pub late_minutes: i64,
    /// Minutes worked beyond the standard shift length.
    pub overtime_minutes: i64,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl AttendanceRecord {
    /// Hours between clock-in and clock-out, rounded to 2 decimal places.
    ///
    /// Returns zero when either clock time is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{AttendanceRecord, AttendanceStatus, RecordId};
    /// use chrono::{NaiveDate, NaiveTime};
    /// use rust_decimal::Decimal;
    ///
    /// let record = AttendanceRecord {
    ///     id: RecordId(1),
    ///     employee_id: RecordId(1),
    ///     date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
    ///     clock_in: NaiveTime::from_hms_opt(9, 0, 0),
    ///     clock_out: NaiveTime::from_hms_opt(17, 20, 0),
    ///     status: AttendanceStatus::Present,
    ///     late_minutes: 0,
    ///     overtime_minutes: 20,
    ///     notes: None,
    /// };
    /// assert_eq!(record.working_hours(), Decimal::new(833, 2));
    /// ```
    pub fn working_hours(&self) -> Decimal {
        match (self.clock_in, self.clock_out) {
            (Some(clock_in), Some(clock_out)) => {
                let minutes = (clock_out - clock_in).num_minutes().max(0);
                (Decimal::from(minutes) / Decimal::from(60))
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            }
            _ => Decimal::ZERO,
        }
    }
}
