//! The monthly payroll and attendance report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use super::{Directory, UNASSIGNED_DEPARTMENT, add_money, minutes_to_hours, percentage, sum_money};
use crate::calculation::working_days;
use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, AttendanceStatus, DateRange, LeaveRequest, LeaveStatus, LeaveType, RecordId,
    SalaryRecord,
};
use crate::store::StoreReader;

/// Headline figures for a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Sum of net salary for records dated in the window.
    pub total_salary: Decimal,
    /// Present days over (working days x active employees), as a percentage.
    pub attendance_rate: Decimal,
    /// Sum of overtime minutes over 60, rounded to 2 places.
    pub overtime_hours: Decimal,
    /// Leave requests whose interval overlaps the window.
    pub leave_requests: usize,
    /// Weekdays in the window.
    pub working_days: i64,
    /// Employees hired on or before the end of the window and still active.
    pub active_employees: usize,
}

/// Net salary paid through one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentSalary {
    /// The department, or `None` for employees without one.
    pub department_id: Option<RecordId>,
    /// Department name, or "Unassigned".
    pub department: String,
    /// Sum of net salary.
    pub total_salary: Decimal,
}

/// Number of attendance records with one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    /// The attendance status.
    pub status: AttendanceStatus,
    /// How many records carry it.
    pub count: usize,
}

/// Chart-ready series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportCharts {
    /// Salary totals by department, in department order with
    /// "Unassigned" last.
    pub salary_by_department: Vec<DepartmentSalary>,
    /// One entry per attendance status, zero-filled.
    pub attendance_by_status: Vec<StatusCount>,
}

/// One salary record with its employee and department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalaryDetail {
    /// The salary record.
    pub salary_id: RecordId,
    /// The employee paid.
    pub employee_id: RecordId,
    /// Employee full name.
    pub employee: String,
    /// Department name, or "Unassigned".
    pub department: String,
    /// Payment date.
    pub salary_date: NaiveDate,
    /// Base salary.
    pub base_salary: Decimal,
    /// Overtime pay.
    pub overtime: Decimal,
    /// Bonus.
    pub bonus: Decimal,
    /// Allowances.
    pub allowances: Decimal,
    /// Deductions.
    pub deductions: Decimal,
    /// Tax.
    pub tax: Decimal,
    /// Net salary.
    pub net_salary: Decimal,
}

/// Attendance of one employee over the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceDetail {
    /// The employee.
    pub employee_id: RecordId,
    /// Employee full name.
    pub employee: String,
    /// Days recorded `present`.
    pub present_days: usize,
    /// Days recorded `absent`.
    pub absent_days: usize,
    /// Days recorded `late`.
    pub late_days: usize,
    /// Days recorded `half_day`.
    pub half_days: usize,
    /// Days recorded `on_leave`.
    pub leave_days: usize,
    /// All recorded days.
    pub total_days: usize,
    /// Overtime in hours, rounded to 2 places.
    pub overtime_hours: Decimal,
    /// Present days over recorded days, as a percentage.
    pub attendance_rate: Decimal,
}

/// One leave request with its employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaveDetail {
    /// The leave request.
    pub leave_id: RecordId,
    /// The employee on leave.
    pub employee_id: RecordId,
    /// Employee full name.
    pub employee: String,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Inclusive day count.
    pub days: i64,
    /// Lifecycle state.
    pub status: LeaveStatus,
    /// Reason given.
    pub reason: String,
}

/// Row-level breakdowns behind the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDetails {
    /// Salary rows ordered by date then employee.
    pub salary: Vec<SalaryDetail>,
    /// Attendance rollups ordered by employee.
    pub attendance: Vec<AttendanceDetail>,
    /// Leave rows, newest start date first.
    pub leave: Vec<LeaveDetail>,
}

/// Everything reported for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollReport {
    /// The window reported on.
    pub period: DateRange,
    /// Headline figures.
    pub summary: ReportSummary,
    /// Chart series.
    pub charts: ReportCharts,
    /// Detail rows.
    pub details: ReportDetails,
}

/// Builds the summary, charts and detail rows for `range`.
///
/// # Errors
///
/// Returns `StoreUnavailable` if the reader fails, or `Overflow` if a net
/// salary total leaves the `Decimal` range.
///
/// # Example
///
/// ```
/// use payroll_engine::models::ReportMonth;
/// use payroll_engine::report::build_report;
/// use payroll_engine::store::{MemoryStore, RecordStore};
/// use rust_decimal::Decimal;
///
/// let store = MemoryStore::new();
/// let month: ReportMonth = "2024-03".parse().unwrap();
/// let report = build_report(&store.snapshot().unwrap(), &month.range()).unwrap();
///
/// assert_eq!(report.summary.total_salary, Decimal::ZERO);
/// assert_eq!(report.summary.working_days, 21);
/// assert_eq!(report.charts.attendance_by_status.len(), 5);
/// ```
pub fn build_report<R: StoreReader + ?Sized>(
    reader: &R,
    range: &DateRange,
) -> EngineResult<PayrollReport> {
    let directory = Directory::load(reader)?;
    let salaries = reader.salaries_between(range)?;
    let attendance = reader.attendance_between(range)?;
    let leave = reader.leave_overlapping(range)?;

    let summary = summarize(&directory, range, &salaries, &attendance, &leave)?;

    info!(
        start = %range.start,
        end = %range.end,
        salary_records = salaries.len(),
        attendance_records = attendance.len(),
        leave_requests = leave.len(),
        total_salary = %summary.total_salary,
        attendance_rate = %summary.attendance_rate,
        "Built payroll report"
    );

    Ok(PayrollReport {
        period: *range,
        summary,
        charts: ReportCharts {
            salary_by_department: salary_by_department(&directory, &salaries)?,
            attendance_by_status: attendance_by_status(&attendance),
        },
        details: ReportDetails {
            salary: salary_details(&directory, &salaries),
            attendance: attendance_details(&directory, &attendance),
            leave: leave_details(&directory, leave),
        },
    })
}

fn summarize(
    directory: &Directory,
    range: &DateRange,
    salaries: &[SalaryRecord],
    attendance: &[AttendanceRecord],
    leave: &[LeaveRequest],
) -> EngineResult<ReportSummary> {
    let working_days = working_days(range);
    let active_employees = directory
        .employees()
        .filter(|employee| employee.is_active_on(range.end))
        .count();
    let present = attendance
        .iter()
        .filter(|record| record.status == AttendanceStatus::Present)
        .count();
    let overtime_minutes: i64 = attendance.iter().map(|record| record.overtime_minutes).sum();

    Ok(ReportSummary {
        total_salary: sum_money(
            salaries.iter().map(|record| record.net_salary),
            "total net salary",
        )?,
        attendance_rate: percentage(present as i64, working_days * active_employees as i64),
        overtime_hours: minutes_to_hours(overtime_minutes),
        leave_requests: leave.len(),
        working_days,
        active_employees,
    })
}

fn salary_by_department(
    directory: &Directory,
    salaries: &[SalaryRecord],
) -> EngineResult<Vec<DepartmentSalary>> {
    let mut totals: BTreeMap<RecordId, Decimal> = BTreeMap::new();
    let mut unassigned: Option<Decimal> = None;

    for record in salaries {
        let total = match directory.department_of(record.employee_id) {
            Some(department) => totals.entry(department.id).or_default(),
            None => unassigned.get_or_insert(Decimal::ZERO),
        };
        add_money(total, record.net_salary, "department net salary")?;
    }

    let mut series: Vec<DepartmentSalary> = directory
        .departments()
        .filter_map(|department| {
            totals.get(&department.id).map(|total| DepartmentSalary {
                department_id: Some(department.id),
                department: department.name.clone(),
                total_salary: *total,
            })
        })
        .collect();

    if let Some(total) = unassigned {
        series.push(DepartmentSalary {
            department_id: None,
            department: UNASSIGNED_DEPARTMENT.to_string(),
            total_salary: total,
        });
    }
    Ok(series)
}

fn attendance_by_status(attendance: &[AttendanceRecord]) -> Vec<StatusCount> {
    AttendanceStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: attendance.iter().filter(|r| r.status == *status).count(),
        })
        .collect()
}

fn salary_details(directory: &Directory, salaries: &[SalaryRecord]) -> Vec<SalaryDetail> {
    salaries
        .iter()
        .map(|record| SalaryDetail {
            salary_id: record.id,
            employee_id: record.employee_id,
            employee: directory.employee_name(record.employee_id),
            department: directory.department_label(record.employee_id),
            salary_date: record.salary_date,
            base_salary: record.base_salary,
            overtime: record.overtime_pay,
            bonus: record.bonus,
            allowances: record.allowances,
            deductions: record.deductions,
            tax: record.tax,
            net_salary: record.net_salary,
        })
        .collect()
}

fn attendance_details(
    directory: &Directory,
    attendance: &[AttendanceRecord],
) -> Vec<AttendanceDetail> {
    let mut by_employee: BTreeMap<RecordId, Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in attendance {
        by_employee.entry(record.employee_id).or_default().push(record);
    }

    by_employee
        .into_iter()
        .map(|(employee_id, records)| {
            let count = |status: AttendanceStatus| {
                records.iter().filter(|r| r.status == status).count()
            };
            let present_days = count(AttendanceStatus::Present);
            let overtime_minutes: i64 = records.iter().map(|r| r.overtime_minutes).sum();

            AttendanceDetail {
                employee_id,
                employee: directory.employee_name(employee_id),
                present_days,
                absent_days: count(AttendanceStatus::Absent),
                late_days: count(AttendanceStatus::Late),
                half_days: count(AttendanceStatus::HalfDay),
                leave_days: count(AttendanceStatus::OnLeave),
                total_days: records.len(),
                overtime_hours: minutes_to_hours(overtime_minutes),
                attendance_rate: percentage(present_days as i64, records.len() as i64),
            }
        })
        .collect()
}

fn leave_details(directory: &Directory, leave: Vec<LeaveRequest>) -> Vec<LeaveDetail> {
    let mut rows: Vec<LeaveDetail> = leave
        .into_iter()
        .map(|request| LeaveDetail {
            leave_id: request.id,
            employee_id: request.employee_id,
            employee: directory.employee_name(request.employee_id),
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            days: request.total_days,
            status: request.status,
            reason: request.reason,
        })
        .collect();
    rows.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.leave_id.cmp(&b.leave_id)));
    rows
}
