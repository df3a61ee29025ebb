//! Attendance derivation.
//!
//! Turns a candidate [`AttendanceEntry`] into the clock times and derived
//! minutes that get persisted. The uniqueness of (employee, date) is
//! enforced by the write path, inside the same transaction as the write.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_STANDARD_HOURS, default_expected_clock_in, lateness_minutes, overtime_minutes};
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceEntry, AttendanceRecord, RecordId};

/// Workplace rules used to derive lateness and overtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePolicy {
    /// The time employees are expected to clock in.
    #[serde(default = "default_expected_clock_in")]
    pub expected_clock_in: NaiveTime,
    /// Length of a standard shift in hours.
    #[serde(default = "default_standard_hours")]
    pub standard_hours: Decimal,
}

fn default_standard_hours() -> Decimal {
    DEFAULT_STANDARD_HOURS
}

impl Default for AttendancePolicy {
    /// 09:00 expected clock-in, 8 hour shifts.
    fn default() -> Self {
        Self {
            expected_clock_in: default_expected_clock_in(),
            standard_hours: DEFAULT_STANDARD_HOURS,
        }
    }
}

/// The fields of an attendance record that are derived rather than entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAttendance {
    /// Clock-in time to persist (cleared for off-duty statuses).
    pub clock_in: Option<NaiveTime>,
    /// Clock-out time to persist (cleared for off-duty statuses).
    pub clock_out: Option<NaiveTime>,
    /// Minutes after the expected clock-in time.
    pub late_minutes: i64,
    /// Minutes beyond the standard shift.
    pub overtime_minutes: i64,
}

impl DerivedAttendance {
    /// Combines the entry with its derived fields into a record.
    pub fn into_record(self, id: RecordId, entry: AttendanceEntry) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id: entry.employee_id,
            date: entry.date,
            clock_in: self.clock_in,
            clock_out: self.clock_out,
            status: entry.status,
            late_minutes: self.late_minutes,
            overtime_minutes: self.overtime_minutes,
            notes: entry.notes,
        }
    }
}

/// Derives clock times, lateness and overtime for an entry.
///
/// For `absent` and `on_leave` the clock times are cleared and both
/// derived values are zero, whatever was supplied. Otherwise lateness is
/// measured against the policy's expected clock-in and overtime against its
/// standard shift length.
///
/// # Errors
///
/// Returns a `Validation` error if an on-duty entry has a clock-out that is
/// not after its clock-in.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{derive_attendance, AttendancePolicy};
/// use payroll_engine::models::{AttendanceEntry, AttendanceStatus, RecordId};
/// use chrono::{NaiveDate, NaiveTime};
///
/// let entry = AttendanceEntry {
///     employee_id: RecordId(1),
///     date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
///     clock_in: NaiveTime::from_hms_opt(9, 15, 0),
///     clock_out: NaiveTime::from_hms_opt(18, 30, 0),
///     status: AttendanceStatus::Late,
///     notes: None,
/// };
///
/// let derived = derive_attendance(&entry, &AttendancePolicy::default()).unwrap();
/// assert_eq!(derived.late_minutes, 15);
/// assert_eq!(derived.overtime_minutes, 75);
/// ```
pub fn derive_attendance(
    entry: &AttendanceEntry,
    policy: &AttendancePolicy,
) -> EngineResult<DerivedAttendance> {
    if entry.status.is_off_duty() {
        return Ok(DerivedAttendance {
            clock_in: None,
            clock_out: None,
            late_minutes: 0,
            overtime_minutes: 0,
        });
    }

    if let (Some(clock_in), Some(clock_out)) = (entry.clock_in, entry.clock_out) {
        if clock_out <= clock_in {
            return Err(EngineError::validation(
                "clock_out",
                format!("{} is not after clock_in {}", clock_out, clock_in),
            ));
        }
    }

    Ok(DerivedAttendance {
        clock_in: entry.clock_in,
        clock_out: entry.clock_out,
        late_minutes: lateness_minutes(entry.clock_in, policy.expected_clock_in),
        overtime_minutes: overtime_minutes(entry.clock_in, entry.clock_out, policy.standard_hours),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;
    use chrono::NaiveDate;

    fn time(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    fn create_test_entry(
        status: AttendanceStatus,
        clock_in: Option<NaiveTime>,
        clock_out: Option<NaiveTime>,
    ) -> AttendanceEntry {
        AttendanceEntry {
            employee_id: RecordId(1),
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            clock_in,
            clock_out,
            status,
            notes: Some("badge reader".to_string()),
        }
    }

    #[test]
    fn test_scenario_b_late_clock_in() {
        let entry = create_test_entry(AttendanceStatus::Late, time(9, 15), None);
        let derived = derive_attendance(&entry, &AttendancePolicy::default()).unwrap();
        assert_eq!(derived.late_minutes, 15);
        assert_eq!(derived.overtime_minutes, 0);
    }

    #[test]
    fn test_scenario_b_overtime() {
        let entry = create_test_entry(AttendanceStatus::Present, time(9, 0), time(18, 30));
        let derived = derive_attendance(&entry, &AttendancePolicy::default()).unwrap();
        assert_eq!(derived.late_minutes, 0);
        assert_eq!(derived.overtime_minutes, 90);
    }

    #[test]
    fn test_absent_clears_clock_times_and_derived_minutes() {
        let entry = create_test_entry(AttendanceStatus::Absent, time(10, 0), time(20, 0));
        let derived = derive_attendance(&entry, &AttendancePolicy::default()).unwrap();
        assert_eq!(derived.clock_in, None);
        assert_eq!(derived.clock_out, None);
        assert_eq!(derived.late_minutes, 0);
        assert_eq!(derived.overtime_minutes, 0);
    }

    #[test]
    fn test_on_leave_clears_clock_times_and_derived_minutes() {
        let entry = create_test_entry(AttendanceStatus::OnLeave, time(11, 0), time(22, 0));
        let derived = derive_attendance(&entry, &AttendancePolicy::default()).unwrap();
        assert_eq!(derived.clock_in, None);
        assert_eq!(derived.late_minutes, 0);
        assert_eq!(derived.overtime_minutes, 0);
    }

    #[test]
    fn test_off_duty_ignores_inverted_clock_times() {
        let entry = create_test_entry(AttendanceStatus::Absent, time(18, 0), time(9, 0));
        assert!(derive_attendance(&entry, &AttendancePolicy::default()).is_ok());
    }

    #[test]
    fn test_clock_out_not_after_clock_in_is_rejected() {
        let entry = create_test_entry(AttendanceStatus::Present, time(18, 0), time(9, 0));
        match derive_attendance(&entry, &AttendancePolicy::default()) {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "clock_out"),
            other => panic!("Expected validation error, got {:?}", other),
        }

        let same = create_test_entry(AttendanceStatus::Present, time(9, 0), time(9, 0));
        assert!(derive_attendance(&same, &AttendancePolicy::default()).is_err());
    }

    #[test]
    fn test_custom_policy() {
        let policy = AttendancePolicy {
            expected_clock_in: time(8, 0).unwrap(),
            standard_hours: Decimal::new(75, 1),
        };
        let entry = create_test_entry(AttendanceStatus::HalfDay, time(8, 20), time(16, 20));
        let derived = derive_attendance(&entry, &policy).unwrap();
        assert_eq!(derived.late_minutes, 20);
        assert_eq!(derived.overtime_minutes, 30);
    }

    #[test]
    fn test_into_record_keeps_entry_fields() {
        let entry = create_test_entry(AttendanceStatus::Present, time(9, 5), time(17, 0));
        let derived = derive_attendance(&entry, &AttendancePolicy::default()).unwrap();
        let record = derived.into_record(RecordId(9), entry);
        assert_eq!(record.id, RecordId(9));
        assert_eq!(record.late_minutes, 5);
        assert_eq!(record.notes.as_deref(), Some("badge reader"));
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: AttendancePolicy = serde_yaml::from_str("standard_hours: 7.5\n").unwrap();
        assert_eq!(policy.expected_clock_in, time(9, 0).unwrap());
        assert_eq!(policy.standard_hours, Decimal::new(75, 1));
    }
}
