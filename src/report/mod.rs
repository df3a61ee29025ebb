//! Reporting over persisted records.
//!
//! Everything in this module is read-only: it takes a [`StoreReader`]
//! (normally a committed snapshot) and rolls its records up by period,
//! department, employee and status. An empty store produces zero-valued
//! reports, not errors.
//!
//! - [`build_report`]: the summary, chart series and detail rows for a
//!   window
//! - [`build_statistics`]: dashboard statistics for a month
//! - [`export_report`]: renders a report into an [`ExportSink`]

mod aggregator;
mod export;
mod statistics;

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::calculation::round_money;
use crate::error::{EngineError, EngineResult};
use crate::models::{Department, Employee, RecordId};
use crate::store::StoreReader;

pub use aggregator::{
    AttendanceDetail, DepartmentSalary, LeaveDetail, PayrollReport, ReportCharts, ReportDetails,
    ReportSummary, SalaryDetail, StatusCount, build_report,
};
pub use export::{
    ATTENDANCE_DETAILS_TABLE, ExportSink, LEAVE_DETAILS_TABLE, ReportTable, SALARY_DETAILS_TABLE,
    SUMMARY_TABLE, TableCollector, export_report, format_money, format_percent,
};
pub use statistics::{
    DepartmentSalaryTotal, DepartmentStatistics, MonthlyAttendanceStats, MonthlySalaryTotal,
    PayrollStatistics, ReportStatistics, build_statistics, department_salary_totals,
    department_statistics, employee_attendance_percentage, monthly_attendance_stats,
    monthly_salary_totals, payroll_statistics,
};

/// Label used for salary and headcount of employees without a department.
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// `numerator / denominator x 100`, rounded to 2 places. Zero when the
/// denominator is not positive.
pub(crate) fn percentage(numerator: i64, denominator: i64) -> Decimal {
    if denominator <= 0 {
        return Decimal::ZERO;
    }
    round_money(Decimal::from(numerator) * Decimal::ONE_HUNDRED / Decimal::from(denominator))
}

/// Minutes as hours, rounded to 2 places.
pub(crate) fn minutes_to_hours(minutes: i64) -> Decimal {
    round_money(Decimal::from(minutes) / Decimal::from(60))
}

/// Sums `amounts`, failing with `Overflow` once the running total leaves
/// the `Decimal` range.
pub(crate) fn sum_money(
    amounts: impl IntoIterator<Item = Decimal>,
    context: &str,
) -> EngineResult<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or_else(|| overflow(context))
}

/// Adds `amount` into `total` in place, with the same overflow rule as
/// [`sum_money`].
pub(crate) fn add_money(total: &mut Decimal, amount: Decimal, context: &str) -> EngineResult<()> {
    *total = total.checked_add(amount).ok_or_else(|| overflow(context))?;
    Ok(())
}

fn overflow(context: &str) -> EngineError {
    EngineError::Overflow {
        context: context.to_string(),
    }
}

/// Employee and department lookups shared by the report builders.
pub(crate) struct Directory {
    employees: BTreeMap<RecordId, Employee>,
    departments: BTreeMap<RecordId, Department>,
}

impl Directory {
    pub(crate) fn load<R: StoreReader + ?Sized>(reader: &R) -> EngineResult<Self> {
        Ok(Self {
            employees: reader.employees()?.into_iter().map(|e| (e.id, e)).collect(),
            departments: reader
                .departments()?
                .into_iter()
                .map(|d| (d.id, d))
                .collect(),
        })
    }

    pub(crate) fn employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }

    pub(crate) fn departments(&self) -> impl Iterator<Item = &Department> {
        self.departments.values()
    }

    pub(crate) fn employee_name(&self, id: RecordId) -> String {
        self.employees
            .get(&id)
            .map(Employee::full_name)
            .unwrap_or_else(|| format!("Employee #{}", id))
    }

    /// The department an employee belongs to, if it still exists.
    pub(crate) fn department_of(&self, employee_id: RecordId) -> Option<&Department> {
        self.employees
            .get(&employee_id)
            .and_then(|employee| employee.department_id)
            .and_then(|id| self.departments.get(&id))
    }

    pub(crate) fn department_label(&self, employee_id: RecordId) -> String {
        self.department_of(employee_id)
            .map(|department| department.name.clone())
            .unwrap_or_else(|| UNASSIGNED_DEPARTMENT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_percentage_rounds_to_two_places() {
        assert_eq!(percentage(2, 3), dec("66.67"));
        assert_eq!(percentage(1, 3), dec("33.33"));
        assert_eq!(percentage(5, 5), dec("100"));
    }

    #[test]
    fn test_percentage_of_empty_denominator_is_zero() {
        assert_eq!(percentage(0, 0), Decimal::ZERO);
        assert_eq!(percentage(3, 0), Decimal::ZERO);
    }

    #[test]
    fn test_sum_money_adds_every_amount() {
        let total = sum_money([dec("1.25"), dec("2.50"), dec("-0.75")], "net salary").unwrap();
        assert_eq!(total, dec("3.00"));
        assert_eq!(sum_money(Vec::new(), "net salary").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_sum_money_reports_overflow() {
        match sum_money([Decimal::MAX, Decimal::ONE], "total net salary") {
            Err(EngineError::Overflow { context }) => assert_eq!(context, "total net salary"),
            other => panic!("Expected overflow error, got {:?}", other),
        }
    }

    #[test]
    fn test_add_money_leaves_total_unchanged_on_overflow() {
        let mut total = Decimal::MAX;
        assert!(add_money(&mut total, Decimal::ONE, "tax").is_err());
        assert_eq!(total, Decimal::MAX);

        let mut total = dec("10");
        add_money(&mut total, dec("5.5"), "tax").unwrap();
        assert_eq!(total, dec("15.5"));
    }

    #[test]
    fn test_minutes_to_hours() {
        assert_eq!(minutes_to_hours(90), dec("1.5"));
        assert_eq!(minutes_to_hours(100), dec("1.67"));
        assert_eq!(minutes_to_hours(0), Decimal::ZERO);
    }
}
