//! Leave request model and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DateRange, RecordId};

/// The kind of leave requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Paid annual leave.
    Annual,
    /// Sick leave.
    Sick,
    /// Personal leave.
    Personal,
    /// Maternity leave.
    Maternity,
    /// Paternity leave.
    Paternity,
    /// Unpaid leave.
    Unpaid,
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveType::Annual => write!(f, "annual"),
            LeaveType::Sick => write!(f, "sick"),
            LeaveType::Personal => write!(f, "personal"),
            LeaveType::Maternity => write!(f, "maternity"),
            LeaveType::Paternity => write!(f, "paternity"),
            LeaveType::Unpaid => write!(f, "unpaid"),
        }
    }
}

/// Where a leave request is in its one-way lifecycle.
///
/// `Pending` is the only state that accepts edits or decisions; `Approved`
/// and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved by a manager.
    Approved,
    /// Rejected with a reason.
    Rejected,
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A leave application as submitted by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// The employee requesting leave.
    pub employee_id: RecordId,
    /// The kind of leave.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Why the leave is requested.
    pub reason: String,
}

/// A persisted leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// The employee requesting leave.
    pub employee_id: RecordId,
    /// The kind of leave.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Inclusive day count between the two dates.
    pub total_days: i64,
    /// Lifecycle state.
    pub status: LeaveStatus,
    /// Why the leave is requested.
    pub reason: String,
    /// Why the request was rejected, once rejected.
    pub rejection_reason: Option<String>,
    /// Who approved the request, once approved.
    pub approved_by: Option<String>,
    /// When the request was approved.
    pub approved_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Returns true while the request still accepts edits and decisions.
    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }

    /// Returns true if any day of the leave falls inside `range`.
    pub fn overlaps(&self, range: &DateRange) -> bool {
        self.start_date <= range.end && self.end_date >= range.start
    }
}
