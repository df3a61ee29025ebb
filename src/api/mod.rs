//! HTTP API module for the Payroll Engine.
//!
//! This module provides the REST API endpoints for recording attendance,
//! managing leave requests and salary records, and reading reports.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ApproveLeaveRequest, EmployeeStatusRequest, RejectLeaveRequest, ReportQuery};
pub use response::{ApiError, ApiErrorResponse, ExportResponse, ReportResponse};
pub use state::AppState;
