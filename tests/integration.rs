//! Integration tests for the Payroll Engine HTTP API.
//!
//! This test suite drives the router end to end:
//! - Salary records and the recompute contract
//! - Attendance derivation and the one-record-per-day rule
//! - The leave request lifecycle
//! - Monthly reports, statistics and export
//! - Error cases (malformed JSON, bad months, store outages)

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config").expect("Failed to load config");
    AppState::with_config(config.into_config())
}

/// Normalize decimal string by removing trailing zeros after decimal point
fn normalize_decimal(s: &str) -> String {
    Decimal::from_str(s).unwrap().normalize().to_string()
}

fn assert_decimal(value: &Value, expected: &str) {
    let actual = value
        .as_str()
        .unwrap_or_else(|| panic!("Expected decimal string, got {}", value));
    assert_eq!(
        normalize_decimal(actual),
        normalize_decimal(expected),
        "Expected {}, got {}",
        expected,
        actual
    );
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, "POST", uri, Some(body.to_string())).await
}

async fn put(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, "PUT", uri, Some(body.to_string())).await
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, "GET", uri, None).await
}

async fn hire(router: &Router, code: &str) -> u64 {
    let (status, body) = post(
        router,
        "/employees",
        json!({
            "employee_code": code,
            "first_name": "Dana",
            "last_name": code,
            "hire_date": "2023-01-02",
            "base_salary": "50000"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "hire failed: {}", body);
    body["id"].as_u64().unwrap()
}

fn scenario_a_salary(employee_id: u64) -> Value {
    json!({
        "employee_id": employee_id,
        "salary_date": "2024-03-29",
        "base_salary": "50000",
        "overtime_hours": "10",
        "overtime_rate": "100",
        "bonus": "2000",
        "allowances": "0",
        "deductions": "500"
    })
}

fn attendance(
    employee_id: u64,
    date: &str,
    clock_in: &str,
    clock_out: &str,
    status: &str,
) -> Value {
    json!({
        "employee_id": employee_id,
        "date": date,
        "clock_in": clock_in,
        "clock_out": clock_out,
        "status": status
    })
}

fn leave_application(employee_id: u64) -> Value {
    json!({
        "employee_id": employee_id,
        "type": "annual",
        "start_date": "2024-03-11",
        "end_date": "2024-03-15",
        "reason": "Family trip"
    })
}

// =============================================================================
// Salary
// =============================================================================

#[tokio::test]
async fn test_create_salary_scenario_a() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;

    let (status, body) = post(&router, "/salaries", scenario_a_salary(employee_id)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_decimal(&body["overtime_pay"], "1000");
    assert_decimal(&body["tax"], "10300");
    assert_decimal(&body["net_salary"], "42200");
}

#[tokio::test]
async fn test_salary_with_supplied_tax_is_rejected() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;

    let mut payload = scenario_a_salary(employee_id);
    payload["tax"] = json!("1");
    let (status, body) = post(&router, "/salaries", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_negative_base_salary_is_validation_error() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;

    let mut payload = scenario_a_salary(employee_id);
    payload["base_salary"] = json!("-1");
    let (status, body) = post(&router, "/salaries", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_salary_recomputes_derived_fields() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;
    let (_, created) = post(&router, "/salaries", scenario_a_salary(employee_id)).await;
    let id = created["id"].as_u64().unwrap();

    let mut payload = scenario_a_salary(employee_id);
    payload["bonus"] = json!("0");
    let (status, body) = put(&router, &format!("/salaries/{}", id), payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_u64(), Some(id));
    // gross 51000: 100 + 600 + 46000 x 20% = 9900
    assert_decimal(&body["tax"], "9900");
    assert_decimal(&body["net_salary"], "40600");
}

#[tokio::test]
async fn test_update_unknown_salary_is_not_found() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;

    let (status, body) = put(&router, "/salaries/999", scenario_a_salary(employee_id)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

// =============================================================================
// Attendance
// =============================================================================

#[tokio::test]
async fn test_record_attendance_derives_late_and_overtime() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;

    let (status, body) = post(
        &router,
        "/attendance",
        attendance(employee_id, "2024-03-04", "09:15:00", "18:30:00", "late"),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["late_minutes"], 15);
    assert_eq!(body["overtime_minutes"], 75);
}

#[tokio::test]
async fn test_second_attendance_same_day_is_conflict() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;
    let entry = attendance(employee_id, "2024-03-04", "09:00:00", "17:00:00", "present");

    let (first, _) = post(&router, "/attendance", entry.clone()).await;
    let (second, body) = post(&router, "/attendance", entry).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_ATTENDANCE");
}

#[tokio::test]
async fn test_attendance_clock_out_before_clock_in_is_rejected() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;

    let (status, body) = post(
        &router,
        "/attendance",
        attendance(employee_id, "2024-03-04", "18:00:00", "09:00:00", "present"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_attendance_for_unknown_employee_is_rejected() {
    let router = create_router(create_test_state());

    let (status, body) = post(
        &router,
        "/attendance",
        attendance(42, "2024-03-04", "09:00:00", "17:00:00", "present"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_correct_attendance_to_absent_clears_clock_times() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;
    let (_, created) = post(
        &router,
        "/attendance",
        attendance(employee_id, "2024-03-04", "09:30:00", "19:00:00", "late"),
    )
    .await;
    let id = created["id"].as_u64().unwrap();

    let (status, body) = put(
        &router,
        &format!("/attendance/{}", id),
        attendance(employee_id, "2024-03-04", "09:30:00", "19:00:00", "absent"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["clock_in"].is_null());
    assert!(body["clock_out"].is_null());
    assert_eq!(body["late_minutes"], 0);
    assert_eq!(body["overtime_minutes"], 0);
}

// =============================================================================
// Leave requests
// =============================================================================

#[tokio::test]
async fn test_leave_lifecycle_approve_then_reject_conflicts() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;

    let (status, submitted) =
        post(&router, "/leave-requests", leave_application(employee_id)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(submitted["total_days"], 5);
    assert_eq!(submitted["status"], "pending");
    let id = submitted["id"].as_u64().unwrap();

    let (status, approved) = post(
        &router,
        &format!("/leave-requests/{}/approve", id),
        json!({ "approved_by": "manager" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["approved_by"], "manager");

    let (status, body) = post(
        &router,
        &format!("/leave-requests/{}/reject", id),
        json!({ "rejection_reason": "Too late" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE_TRANSITION");

    let (status, _) = put(
        &router,
        &format!("/leave-requests/{}", id),
        leave_application(employee_id),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_edit_pending_leave_recomputes_total_days() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;
    let (_, submitted) = post(&router, "/leave-requests", leave_application(employee_id)).await;
    let id = submitted["id"].as_u64().unwrap();

    let mut edited = leave_application(employee_id);
    edited["end_date"] = json!("2024-03-12");
    let (status, body) = put(&router, &format!("/leave-requests/{}", id), edited).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_days"], 2);
}

#[tokio::test]
async fn test_reject_requires_reason() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;
    let (_, submitted) = post(&router, "/leave-requests", leave_application(employee_id)).await;
    let id = submitted["id"].as_u64().unwrap();

    let (status, body) = post(
        &router,
        &format!("/leave-requests/{}/reject", id),
        json!({ "rejection_reason": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_approve_unknown_leave_is_not_found() {
    let router = create_router(create_test_state());

    let (status, body) = post(
        &router,
        "/leave-requests/77/approve",
        json!({ "approved_by": "manager" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_leave_end_before_start_is_rejected() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;

    let mut application = leave_application(employee_id);
    application["end_date"] = json!("2024-03-01");
    let (status, _) = post(&router, "/leave-requests", application).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Directory
// =============================================================================

#[tokio::test]
async fn test_duplicate_department_name_is_conflict() {
    let router = create_router(create_test_state());
    let department = json!({ "name": "Finance", "budget": "100000" });

    let (first, _) = post(&router, "/departments", department.clone()).await;
    let (second, body) = post(&router, "/departments", department).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_KEY");
}

#[tokio::test]
async fn test_set_employee_status() {
    let router = create_router(create_test_state());
    let employee_id = hire(&router, "E001").await;

    let (status, body) = put(
        &router,
        &format!("/employees/{}/status", employee_id),
        json!({ "status": "terminated" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "terminated");
}

// =============================================================================
// Reports
// =============================================================================

async fn seed_march(router: &Router) -> u64 {
    let employee_id = hire(router, "E001").await;
    post(router, "/salaries", scenario_a_salary(employee_id)).await;
    post(
        router,
        "/attendance",
        attendance(employee_id, "2024-03-04", "09:00:00", "18:30:00", "present"),
    )
    .await;
    post(router, "/leave-requests", leave_application(employee_id)).await;
    employee_id
}

#[tokio::test]
async fn test_monthly_report_summary() {
    let router = create_router(create_test_state());
    seed_march(&router).await;

    let (status, body) = get(&router, "/reports?month=2024-03").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["month"], "2024-03");
    let summary = &body["summary"];
    assert_decimal(&summary["total_salary"], "42200");
    // 1 present day / (21 working days x 1 active employee)
    assert_decimal(&summary["attendance_rate"], "4.76");
    assert_decimal(&summary["overtime_hours"], "1.5");
    assert_eq!(summary["leave_requests"], 1);
    assert_eq!(summary["working_days"], 21);
    assert_eq!(body["details"]["salary"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_report_for_empty_month_is_zeroed() {
    let router = create_router(create_test_state());
    seed_march(&router).await;

    let (status, body) = get(&router, "/reports?month=2023-07").await;

    assert_eq!(status, StatusCode::OK);
    assert_decimal(&body["summary"]["total_salary"], "0");
    assert_eq!(body["summary"]["leave_requests"], 0);
}

#[tokio::test]
async fn test_report_without_month_defaults_to_current() {
    let router = create_router(create_test_state());

    let (status, body) = get(&router, "/reports").await;

    assert_eq!(status, StatusCode::OK);
    let expected = chrono::Utc::now().format("%Y-%m").to_string();
    assert_eq!(body["month"], expected);
}

#[tokio::test]
async fn test_report_with_invalid_month_is_bad_request() {
    let router = create_router(create_test_state());

    for month in ["2024-13", "March", "2024-3"] {
        let (status, body) = get(&router, &format!("/reports?month={}", month)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "month {}", month);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_statistics_for_month() {
    let router = create_router(create_test_state());
    seed_march(&router).await;

    let (status, body) = get(&router, "/reports/statistics?month=2024-03").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["month"], "2024-03");
    assert_eq!(body["payroll"]["record_count"], 1);
    assert_decimal(&body["payroll"]["total_net_salary"], "42200");
}

#[tokio::test]
async fn test_export_writes_summary_and_detail_tables() {
    let router = create_router(create_test_state());
    seed_march(&router).await;

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/reports/export?month=2024-03")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("payroll_report_2024-03.json"));

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    let names: Vec<&str> = body["tables"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Summary", "Salary Details", "Attendance Details", "Leave Details"]
    );

    let summary_rows = &body["tables"][0]["rows"];
    assert_eq!(summary_rows[0], json!(["Total Salary", "42200.00"]));
    assert_eq!(summary_rows[1], json!(["Attendance Rate", "4.76%"]));
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let router = create_router(create_test_state());

    let (status, body) = send(&router, "POST", "/attendance", Some("{not json".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_field_is_validation_error() {
    let router = create_router(create_test_state());

    let (status, body) = post(&router, "/leave-requests", json!({ "employee_id": 1 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_store_outage_is_service_unavailable() {
    let state = create_test_state();
    let router = create_router(state.clone());
    let employee_id = hire(&router, "E001").await;

    state.engine().store().set_available(false);
    let (status, body) = post(&router, "/salaries", scenario_a_salary(employee_id)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
    assert_eq!(body["retryable"], true);

    state.engine().store().set_available(true);
    let (status, _) = post(&router, "/salaries", scenario_a_salary(employee_id)).await;
    assert_eq!(status, StatusCode::CREATED);
}
