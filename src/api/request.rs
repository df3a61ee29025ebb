//! Request types for the Payroll Engine API.
//!
//! Create and edit payloads deserialize straight into the model input
//! types; this module holds the bodies and query strings that only exist
//! at the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::models::EmployeeStatus;

/// Query string accepted by the report endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    /// The month to report on, `YYYY-MM`. Defaults to the current month.
    #[serde(default)]
    pub month: Option<String>,
}

/// Body of `POST /leave-requests/:id/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveLeaveRequest {
    /// The user approving the request.
    pub approved_by: String,
}

/// Body of `POST /leave-requests/:id/reject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectLeaveRequest {
    /// Why the request was rejected.
    pub rejection_reason: String,
}

/// Body of `PUT /employees/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeStatusRequest {
    /// The new employment status.
    pub status: EmployeeStatus,
}
