//! Core data models for the Payroll Engine.
//!
//! This module contains the persisted records, their closed status
//! enumerations, the input types accepted by the write path, and the
//! period types used by reports.

mod attendance;
mod employee;
mod leave;
mod period;
mod record_id;
mod salary;

pub use attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus};
pub use employee::{Department, Employee, EmployeeStatus, NewDepartment, NewEmployee};
pub use leave::{LeaveApplication, LeaveRequest, LeaveStatus, LeaveType};
pub use period::{DateRange, ReportMonth};
pub use record_id::RecordId;
pub use salary::{PaymentMethod, PaymentStatus, SalaryInput, SalaryRecord};
