//! Calculation logic for the Payroll Engine.
//!
//! This module contains the pure functions that derive every computed field
//! the engine persists: inclusive day spans, lateness and overtime minutes,
//! the progressive tax assessment, the salary recompute, attendance
//! derivation and the leave request state machine. Nothing here touches the
//! record store or logs.

mod attendance;
mod leave;
mod salary;
mod tax;
mod time_window;

pub use attendance::{AttendancePolicy, DerivedAttendance, derive_attendance};
pub use leave::{
    LeaveAction, approve_leave_request, edit_leave_request, ensure_pending, leave_total_days,
    new_leave_request, reject_leave_request,
};
pub use salary::{MAX_AMOUNT, SalaryBreakdown, calculate_salary, recompute, round_money};
pub use tax::{TaxAssessment, TaxBracket, TaxBracketTable, TaxSlice};
pub use time_window::{
    DEFAULT_STANDARD_HOURS, default_expected_clock_in, inclusive_day_span, is_weekend,
    lateness_minutes, overtime_minutes, working_days,
};
