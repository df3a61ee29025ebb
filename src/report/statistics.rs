//! Dashboard statistics.
//!
//! Payroll totals, department headcount and salary, month-by-month salary
//! and attendance series, and per-employee attendance percentages. Working
//! days always exclude weekends, matching the report summary.

use chrono::Months;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use super::{Directory, UNASSIGNED_DEPARTMENT, add_money, percentage, sum_money};
use crate::calculation::{round_money, working_days};
use crate::error::EngineResult;
use crate::models::{AttendanceStatus, DateRange, RecordId, ReportMonth};
use crate::store::StoreReader;

/// How many months the monthly series in [`ReportStatistics`] cover.
pub const TRAILING_MONTHS: u32 = 12;

/// Net salary figures for a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollStatistics {
    /// Number of salary records.
    pub record_count: usize,
    /// Sum of net salary.
    pub total_net_salary: Decimal,
    /// Mean net salary per record, rounded to 2 places.
    pub average_net_salary: Decimal,
    /// Largest single net salary.
    pub highest_net_salary: Decimal,
}

/// Headcount and budget of a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentStatistics {
    /// The department.
    pub department_id: RecordId,
    /// Department name.
    pub name: String,
    /// Annual budget.
    pub budget: Decimal,
    /// Employees assigned to the department, any status.
    pub employee_count: usize,
}

/// Salary paid through a department over a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentSalaryTotal {
    /// The department, or `None` for employees without one.
    pub department_id: Option<RecordId>,
    /// Department name, or "Unassigned".
    pub department: String,
    /// Distinct employees paid.
    pub employee_count: usize,
    /// Sum of net salary.
    pub total_net_salary: Decimal,
    /// Net salary per paid employee, rounded to 2 places.
    pub average_net_salary: Decimal,
}

/// Salary components summed over one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySalaryTotal {
    /// The month.
    pub month: ReportMonth,
    /// Number of salary records.
    pub record_count: usize,
    /// Sum of base salary.
    pub base_salary: Decimal,
    /// Sum of overtime pay.
    pub overtime_pay: Decimal,
    /// Sum of bonuses.
    pub bonus: Decimal,
    /// Sum of allowances.
    pub allowances: Decimal,
    /// Sum of deductions.
    pub deductions: Decimal,
    /// Sum of tax.
    pub tax: Decimal,
    /// Sum of net salary.
    pub net_salary: Decimal,
}

/// Attendance counted over one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyAttendanceStats {
    /// The month.
    pub month: ReportMonth,
    /// Records per status, every status present.
    pub status_counts: BTreeMap<AttendanceStatus, usize>,
    /// Sum of late minutes.
    pub total_late_minutes: i64,
    /// Sum of overtime minutes.
    pub total_overtime_minutes: i64,
}

/// All dashboard statistics for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportStatistics {
    /// The month reported on.
    pub month: ReportMonth,
    /// Net salary figures for the month.
    pub payroll: PayrollStatistics,
    /// Headcount per department.
    pub departments: Vec<DepartmentStatistics>,
    /// Salary per department for the month.
    pub department_salaries: Vec<DepartmentSalaryTotal>,
    /// Salary per month, newest first, over the trailing months.
    pub monthly_salaries: Vec<MonthlySalaryTotal>,
    /// Attendance per month, newest first, over the trailing months.
    pub monthly_attendance: Vec<MonthlyAttendanceStats>,
}

/// Net salary totals for `range`.
pub fn payroll_statistics<R: StoreReader + ?Sized>(
    reader: &R,
    range: &DateRange,
) -> EngineResult<PayrollStatistics> {
    let salaries = reader.salaries_between(range)?;
    let total = sum_money(
        salaries.iter().map(|record| record.net_salary),
        "total net salary",
    )?;

    let average = if salaries.is_empty() {
        Decimal::ZERO
    } else {
        round_money(total / Decimal::from(salaries.len()))
    };

    Ok(PayrollStatistics {
        record_count: salaries.len(),
        total_net_salary: total,
        average_net_salary: average,
        highest_net_salary: salaries
            .iter()
            .map(|record| record.net_salary)
            .max()
            .unwrap_or(Decimal::ZERO),
    })
}

/// Headcount and budget for every department, in department order.
pub fn department_statistics<R: StoreReader + ?Sized>(
    reader: &R,
) -> EngineResult<Vec<DepartmentStatistics>> {
    let directory = Directory::load(reader)?;

    Ok(directory
        .departments()
        .map(|department| DepartmentStatistics {
            department_id: department.id,
            name: department.name.clone(),
            budget: department.budget,
            employee_count: directory
                .employees()
                .filter(|employee| employee.department_id == Some(department.id))
                .count(),
        })
        .collect())
}

/// Net salary paid through each department over `range`.
///
/// Departments with no salary records in the window are omitted;
/// employees without a department are grouped last as "Unassigned".
pub fn department_salary_totals<R: StoreReader + ?Sized>(
    reader: &R,
    range: &DateRange,
) -> EngineResult<Vec<DepartmentSalaryTotal>> {
    let directory = Directory::load(reader)?;

    let mut groups: BTreeMap<Option<RecordId>, (BTreeSet<RecordId>, Decimal)> = BTreeMap::new();
    for record in reader.salaries_between(range)? {
        let department_id = directory.department_of(record.employee_id).map(|d| d.id);
        let (employees, total) = groups.entry(department_id).or_default();
        employees.insert(record.employee_id);
        add_money(total, record.net_salary, "department net salary")?;
    }

    let total_for = |department_id: Option<RecordId>, department: String| {
        groups.get(&department_id).map(|(employees, total)| DepartmentSalaryTotal {
            department_id,
            department,
            employee_count: employees.len(),
            total_net_salary: *total,
            average_net_salary: round_money(*total / Decimal::from(employees.len())),
        })
    };

    let mut totals: Vec<DepartmentSalaryTotal> = directory
        .departments()
        .filter_map(|department| total_for(Some(department.id), department.name.clone()))
        .collect();
    totals.extend(total_for(None, UNASSIGNED_DEPARTMENT.to_string()));
    Ok(totals)
}

/// Salary components summed per month over `range`, newest month first.
/// Months without records are omitted.
pub fn monthly_salary_totals<R: StoreReader + ?Sized>(
    reader: &R,
    range: &DateRange,
) -> EngineResult<Vec<MonthlySalaryTotal>> {
    let mut months: BTreeMap<ReportMonth, MonthlySalaryTotal> = BTreeMap::new();

    for record in reader.salaries_between(range)? {
        let month = ReportMonth::containing(record.salary_date);
        let total = months.entry(month).or_insert_with(|| MonthlySalaryTotal {
            month,
            record_count: 0,
            base_salary: Decimal::ZERO,
            overtime_pay: Decimal::ZERO,
            bonus: Decimal::ZERO,
            allowances: Decimal::ZERO,
            deductions: Decimal::ZERO,
            tax: Decimal::ZERO,
            net_salary: Decimal::ZERO,
        });

        total.record_count += 1;
        add_money(&mut total.base_salary, record.base_salary, "monthly base salary")?;
        add_money(&mut total.overtime_pay, record.overtime_pay, "monthly overtime pay")?;
        add_money(&mut total.bonus, record.bonus, "monthly bonus")?;
        add_money(&mut total.allowances, record.allowances, "monthly allowances")?;
        add_money(&mut total.deductions, record.deductions, "monthly deductions")?;
        add_money(&mut total.tax, record.tax, "monthly tax")?;
        add_money(&mut total.net_salary, record.net_salary, "monthly net salary")?;
    }

    Ok(months.into_values().rev().collect())
}

/// Attendance counted per month over `range`, newest month first.
/// Months without records are omitted.
pub fn monthly_attendance_stats<R: StoreReader + ?Sized>(
    reader: &R,
    range: &DateRange,
) -> EngineResult<Vec<MonthlyAttendanceStats>> {
    let mut months: BTreeMap<ReportMonth, MonthlyAttendanceStats> = BTreeMap::new();

    for record in reader.attendance_between(range)? {
        let month = ReportMonth::containing(record.date);
        let stats = months.entry(month).or_insert_with(|| MonthlyAttendanceStats {
            month,
            status_counts: AttendanceStatus::ALL.iter().map(|s| (*s, 0)).collect(),
            total_late_minutes: 0,
            total_overtime_minutes: 0,
        });

        *stats.status_counts.entry(record.status).or_default() += 1;
        stats.total_late_minutes += record.late_minutes;
        stats.total_overtime_minutes += record.overtime_minutes;
    }

    Ok(months.into_values().rev().collect())
}

/// Present days over working days in `range`, as a percentage.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{RecordId, ReportMonth};
/// use payroll_engine::report::employee_attendance_percentage;
/// use payroll_engine::store::{MemoryStore, RecordStore};
/// use rust_decimal::Decimal;
///
/// let store = MemoryStore::new();
/// let month: ReportMonth = "2024-03".parse().unwrap();
/// let snapshot = store.snapshot().unwrap();
/// let rate = employee_attendance_percentage(&snapshot, RecordId(1), &month.range()).unwrap();
/// assert_eq!(rate, Decimal::ZERO);
/// ```
pub fn employee_attendance_percentage<R: StoreReader + ?Sized>(
    reader: &R,
    employee_id: RecordId,
    range: &DateRange,
) -> EngineResult<Decimal> {
    let present = reader
        .attendance_between(range)?
        .iter()
        .filter(|record| {
            record.employee_id == employee_id && record.status == AttendanceStatus::Present
        })
        .count();
    Ok(percentage(present as i64, working_days(range)))
}

/// Builds every dashboard statistic for `month`. The monthly series cover
/// the trailing [`TRAILING_MONTHS`] months ending with `month`.
pub fn build_statistics<R: StoreReader + ?Sized>(
    reader: &R,
    month: ReportMonth,
) -> EngineResult<ReportStatistics> {
    let range = month.range();
    let trailing_start = range
        .start
        .checked_sub_months(Months::new(TRAILING_MONTHS - 1))
        .unwrap_or(range.start);
    let trailing = DateRange::new(trailing_start, range.end)?;

    let statistics = ReportStatistics {
        month,
        payroll: payroll_statistics(reader, &range)?,
        departments: department_statistics(reader)?,
        department_salaries: department_salary_totals(reader, &range)?,
        monthly_salaries: monthly_salary_totals(reader, &trailing)?,
        monthly_attendance: monthly_attendance_stats(reader, &trailing)?,
    };

    info!(
        %month,
        salary_records = statistics.payroll.record_count,
        departments = statistics.departments.len(),
        "Built payroll statistics"
    );
    Ok(statistics)
}
