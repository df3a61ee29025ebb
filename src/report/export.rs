//! Export of a report as named tables.
//!
//! The byte-level document writer lives behind [`ExportSink`]; this module
//! only decides which tables exist, their column order and how values are
//! formatted. Money is written with 2 decimal places, percentages with 2
//! decimal places and a trailing `%`.

use rust_decimal::Decimal;
use serde::Serialize;

use super::PayrollReport;
use crate::calculation::round_money;
use crate::error::EngineResult;

/// Name of the summary table.
pub const SUMMARY_TABLE: &str = "Summary";
/// Name of the salary detail table.
pub const SALARY_DETAILS_TABLE: &str = "Salary Details";
/// Name of the attendance detail table.
pub const ATTENDANCE_DETAILS_TABLE: &str = "Attendance Details";
/// Name of the leave detail table.
pub const LEAVE_DETAILS_TABLE: &str = "Leave Details";

/// A named table of already-formatted cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    /// Table (sheet) name.
    pub name: String,
    /// Column headers in order.
    pub columns: Vec<String>,
    /// Rows, each with one cell per column.
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// Receives the rendered tables of a report.
pub trait ExportSink {
    /// Accepts one table. Tables arrive in a fixed order: summary, salary,
    /// attendance, leave.
    fn write_table(&mut self, table: ReportTable) -> EngineResult<()>;
}

/// An [`ExportSink`] that keeps every table in memory.
#[derive(Debug, Clone, Default)]
pub struct TableCollector {
    tables: Vec<ReportTable>,
}

impl TableCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tables received so far.
    pub fn tables(&self) -> &[ReportTable] {
        &self.tables
    }

    /// Consumes the collector, returning its tables.
    pub fn into_tables(self) -> Vec<ReportTable> {
        self.tables
    }
}

impl ExportSink for TableCollector {
    fn write_table(&mut self, table: ReportTable) -> EngineResult<()> {
        self.tables.push(table);
        Ok(())
    }
}

/// Formats a money amount with exactly 2 decimal places.
///
/// # Examples
///
/// ```
/// use payroll_engine::report::format_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_money(Decimal::from(42200)), "42200.00");
/// assert_eq!(format_money(Decimal::new(12345, 3)), "12.35");
/// ```
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = round_money(amount);
    rounded.rescale(2);
    rounded.to_string()
}

/// Formats a percentage with 2 decimal places and a trailing `%`.
///
/// # Examples
///
/// ```
/// use payroll_engine::report::format_percent;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_percent(Decimal::new(476, 2)), "4.76%");
/// assert_eq!(format_percent(Decimal::ZERO), "0.00%");
/// ```
pub fn format_percent(rate: Decimal) -> String {
    format!("{}%", format_money(rate))
}

/// Renders `report` into `sink` as the summary table followed by the
/// salary, attendance and leave detail tables.
///
/// # Errors
///
/// Stops at, and returns, the first error the sink reports.
pub fn export_report<S: ExportSink + ?Sized>(
    report: &PayrollReport,
    sink: &mut S,
) -> EngineResult<()> {
    sink.write_table(summary_table(report))?;
    sink.write_table(salary_table(report))?;
    sink.write_table(attendance_table(report))?;
    sink.write_table(leave_table(report))?;

    tracing::debug!(
        start = %report.period.start,
        end = %report.period.end,
        "Exported payroll report"
    );
    Ok(())
}

fn summary_table(report: &PayrollReport) -> ReportTable {
    let summary = &report.summary;
    let mut table = ReportTable::new(SUMMARY_TABLE, &["Metric", "Value"]);

    table.push_row(vec!["Total Salary".to_string(), format_money(summary.total_salary)]);
    table.push_row(vec![
        "Attendance Rate".to_string(),
        format_percent(summary.attendance_rate),
    ]);
    table.push_row(vec![
        "Overtime Hours".to_string(),
        format_money(summary.overtime_hours),
    ]);
    table.push_row(vec![
        "Leave Request Count".to_string(),
        summary.leave_requests.to_string(),
    ]);
    table
}

fn salary_table(report: &PayrollReport) -> ReportTable {
    let mut table = ReportTable::new(
        SALARY_DETAILS_TABLE,
        &[
            "Employee",
            "Department",
            "Base Salary",
            "Overtime",
            "Bonus",
            "Deductions",
            "Net Salary",
        ],
    );

    for row in &report.details.salary {
        table.push_row(vec![
            row.employee.clone(),
            row.department.clone(),
            format_money(row.base_salary),
            format_money(row.overtime),
            format_money(row.bonus),
            format_money(row.deductions),
            format_money(row.net_salary),
        ]);
    }
    table
}

fn attendance_table(report: &PayrollReport) -> ReportTable {
    let mut table = ReportTable::new(
        ATTENDANCE_DETAILS_TABLE,
        &[
            "Employee",
            "Present Days",
            "Absent Days",
            "Late Days",
            "Leave Days",
            "Overtime Hours",
            "Attendance Rate",
        ],
    );

    for row in &report.details.attendance {
        table.push_row(vec![
            row.employee.clone(),
            row.present_days.to_string(),
            row.absent_days.to_string(),
            row.late_days.to_string(),
            row.leave_days.to_string(),
            format_money(row.overtime_hours),
            format_percent(row.attendance_rate),
        ]);
    }
    table
}

fn leave_table(report: &PayrollReport) -> ReportTable {
    let mut table = ReportTable::new(
        LEAVE_DETAILS_TABLE,
        &["Employee", "Type", "Start", "End", "Days", "Status", "Reason"],
    );

    for row in &report.details.leave {
        table.push_row(vec![
            row.employee.clone(),
            row.leave_type.to_string(),
            row.start_date.to_string(),
            row.end_date.to_string(),
            row.days.to_string(),
            row.status.to_string(),
            row.reason.clone(),
        ]);
    }
    table
}
