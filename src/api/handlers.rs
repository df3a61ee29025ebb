//! HTTP request handlers for the Payroll Engine API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler tags its request with a correlation id, hands the decoded body
//! to the engine and maps the outcome to a JSON response.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    AttendanceEntry, LeaveApplication, NewDepartment, NewEmployee, RecordId, ReportMonth,
    SalaryInput,
};
use crate::report::TableCollector;

use super::request::{
    ApproveLeaveRequest, EmployeeStatusRequest, RejectLeaveRequest, ReportQuery,
};
use super::response::{ApiError, ApiErrorResponse, ExportResponse, ReportResponse};
use super::state::AppState;

type HandlerResult = Result<Response, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/reports", get(report_handler))
        .route("/reports/export", get(export_handler))
        .route("/reports/statistics", get(statistics_handler))
        .route("/employees", post(hire_employee_handler))
        .route("/employees/:id/status", put(employee_status_handler))
        .route("/departments", post(create_department_handler))
        .route("/attendance", post(record_attendance_handler))
        .route(
            "/attendance/:id",
            put(correct_attendance_handler).delete(delete_attendance_handler),
        )
        .route("/leave-requests", post(submit_leave_handler))
        .route(
            "/leave-requests/:id",
            put(edit_leave_handler).delete(withdraw_leave_handler),
        )
        .route("/leave-requests/:id/approve", post(approve_leave_handler))
        .route("/leave-requests/:id/reject", post(reject_leave_handler))
        .route("/salaries", post(create_salary_handler))
        .route(
            "/salaries/:id",
            put(update_salary_handler).delete(delete_salary_handler),
        )
        .with_state(state)
}

/// Unwraps a JSON body, turning extractor rejections into 400 responses.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's message, including the field name
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") || body_text.contains("unknown field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

fn parse_month(query: &ReportQuery, correlation_id: Uuid) -> Result<ReportMonth, ApiErrorResponse> {
    ReportMonth::parse_or_current(query.month.as_deref()).map_err(|err| {
        warn!(
            correlation_id = %correlation_id,
            month = ?query.month,
            "Invalid report month"
        );
        err.into()
    })
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Logs the outcome of an engine call and builds the response.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    operation: &str,
    status: StatusCode,
    started: Instant,
    result: EngineResult<T>,
) -> HandlerResult {
    match result {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                duration_us = started.elapsed().as_micros(),
                "Request completed"
            );
            Ok(json_response(status, body))
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                retryable = err.is_retryable(),
                "Request failed"
            );
            Err(err.into())
        }
    }
}

/// Handler for GET /reports.
async fn report_handler(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let month = parse_month(&query, correlation_id)?;
    info!(correlation_id = %correlation_id, month = %month, "Building report");

    let result = state
        .engine()
        .monthly_report(month)
        .map(|report| ReportResponse { month, report });
    respond(correlation_id, "report", StatusCode::OK, started, result)
}

/// Handler for GET /reports/statistics.
async fn statistics_handler(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let month = parse_month(&query, correlation_id)?;
    info!(correlation_id = %correlation_id, month = %month, "Building statistics");

    let result = state.engine().statistics(month);
    respond(correlation_id, "statistics", StatusCode::OK, started, result)
}

/// Handler for GET /reports/export.
///
/// Returns the summary block and the three detail tables as JSON, with a
/// `Content-Disposition` header naming the month.
async fn export_handler(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let month = parse_month(&query, correlation_id)?;
    info!(correlation_id = %correlation_id, month = %month, "Exporting report");

    let mut sink = TableCollector::new();
    if let Err(err) = state.engine().export_month(month, &mut sink) {
        return respond::<()>(correlation_id, "export", StatusCode::OK, started, Err(err));
    }

    let filename = format!("payroll_report_{}.json", month);
    info!(
        correlation_id = %correlation_id,
        tables = sink.tables().len(),
        duration_us = started.elapsed().as_micros(),
        "Export completed"
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);
    let body = ExportResponse {
        month,
        filename,
        tables: sink.into_tables(),
    };
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Json(body),
    )
        .into_response())
}

/// Handler for POST /employees.
async fn hire_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let new_employee = parse_body(payload, correlation_id)?;
    info!(
        correlation_id = %correlation_id,
        employee_code = %new_employee.employee_code,
        "Hiring employee"
    );

    let result = state.engine().hire_employee(new_employee);
    respond(correlation_id, "hire_employee", StatusCode::CREATED, started, result)
}

/// Handler for PUT /employees/:id/status.
async fn employee_status_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    payload: Result<Json<EmployeeStatusRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = parse_body(payload, correlation_id)?;

    let result = state.engine().set_employee_status(id, request.status);
    respond(correlation_id, "set_employee_status", StatusCode::OK, started, result)
}

/// Handler for POST /departments.
async fn create_department_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewDepartment>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let new_department = parse_body(payload, correlation_id)?;

    let result = state.engine().create_department(new_department);
    respond(correlation_id, "create_department", StatusCode::CREATED, started, result)
}

/// Handler for POST /attendance.
async fn record_attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceEntry>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let entry = parse_body(payload, correlation_id)?;
    info!(
        correlation_id = %correlation_id,
        employee_id = %entry.employee_id,
        date = %entry.date,
        "Recording attendance"
    );

    let result = state.engine().record_attendance(entry);
    respond(correlation_id, "record_attendance", StatusCode::CREATED, started, result)
}

/// Handler for PUT /attendance/:id.
async fn correct_attendance_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    payload: Result<Json<AttendanceEntry>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let entry = parse_body(payload, correlation_id)?;

    let result = state.engine().correct_attendance(id, entry);
    respond(correlation_id, "correct_attendance", StatusCode::OK, started, result)
}

/// Handler for DELETE /attendance/:id.
async fn delete_attendance_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let result = state.engine().delete_attendance(id);
    respond(correlation_id, "delete_attendance", StatusCode::OK, started, result)
}

/// Handler for POST /leave-requests.
async fn submit_leave_handler(
    State(state): State<AppState>,
    payload: Result<Json<LeaveApplication>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let application = parse_body(payload, correlation_id)?;
    info!(
        correlation_id = %correlation_id,
        employee_id = %application.employee_id,
        leave_type = %application.leave_type,
        "Submitting leave request"
    );

    let result = state.engine().submit_leave(application);
    respond(correlation_id, "submit_leave", StatusCode::CREATED, started, result)
}

/// Handler for PUT /leave-requests/:id.
async fn edit_leave_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    payload: Result<Json<LeaveApplication>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let application = parse_body(payload, correlation_id)?;

    let result = state.engine().edit_leave(id, application);
    respond(correlation_id, "edit_leave", StatusCode::OK, started, result)
}

/// Handler for DELETE /leave-requests/:id.
async fn withdraw_leave_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let result = state.engine().withdraw_leave(id);
    respond(correlation_id, "withdraw_leave", StatusCode::OK, started, result)
}

/// Handler for POST /leave-requests/:id/approve.
async fn approve_leave_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    payload: Result<Json<ApproveLeaveRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = parse_body(payload, correlation_id)?;
    info!(
        correlation_id = %correlation_id,
        leave_request_id = %id,
        approved_by = %request.approved_by,
        "Approving leave request"
    );

    let result = state.engine().approve_leave(id, &request.approved_by);
    respond(correlation_id, "approve_leave", StatusCode::OK, started, result)
}

/// Handler for POST /leave-requests/:id/reject.
async fn reject_leave_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    payload: Result<Json<RejectLeaveRequest>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let request = parse_body(payload, correlation_id)?;

    let result = state.engine().reject_leave(id, &request.rejection_reason);
    respond(correlation_id, "reject_leave", StatusCode::OK, started, result)
}

/// Handler for POST /salaries.
async fn create_salary_handler(
    State(state): State<AppState>,
    payload: Result<Json<SalaryInput>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let input = parse_body(payload, correlation_id)?;
    info!(
        correlation_id = %correlation_id,
        employee_id = %input.employee_id,
        salary_date = %input.salary_date,
        "Creating salary record"
    );

    let result = state.engine().create_salary(input);
    respond(correlation_id, "create_salary", StatusCode::CREATED, started, result)
}

/// Handler for PUT /salaries/:id.
async fn update_salary_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    payload: Result<Json<SalaryInput>, JsonRejection>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();
    let input = parse_body(payload, correlation_id)?;

    let result = state.engine().update_salary(id, input);
    respond(correlation_id, "update_salary", StatusCode::OK, started, result)
}

/// Handler for DELETE /salaries/:id.
async fn delete_salary_handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> HandlerResult {
    let correlation_id = Uuid::new_v4();
    let started = Instant::now();

    let result = state.engine().delete_salary(id);
    respond(correlation_id, "delete_salary", StatusCode::OK, started, result)
}
