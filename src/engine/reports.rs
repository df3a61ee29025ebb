//! Read-side entry points. Each call works against one committed snapshot,
//! so a report never mixes records from before and after a concurrent write.

use tracing::info;

use crate::error::EngineResult;
use crate::models::{DateRange, ReportMonth};
use crate::report::{
    ExportSink, PayrollReport, ReportStatistics, build_report, build_statistics, export_report,
};
use crate::store::RecordStore;

use super::PayrollEngine;

impl<S: RecordStore> PayrollEngine<S> {
    /// Builds the payroll report for an arbitrary window.
    pub fn report_for(&self, range: &DateRange) -> EngineResult<PayrollReport> {
        let snapshot = self.store.snapshot()?;
        build_report(&snapshot, range)
    }

    /// Builds the payroll report for a calendar month.
    pub fn monthly_report(&self, month: ReportMonth) -> EngineResult<PayrollReport> {
        self.report_for(&month.range())
    }

    /// Builds the dashboard statistics for a calendar month.
    pub fn statistics(&self, month: ReportMonth) -> EngineResult<ReportStatistics> {
        let snapshot = self.store.snapshot()?;
        build_statistics(&snapshot, month)
    }

    /// Renders the month's report into `sink`.
    pub fn export_month<E: ExportSink + ?Sized>(
        &self,
        month: ReportMonth,
        sink: &mut E,
    ) -> EngineResult<PayrollReport> {
        let report = self.monthly_report(month)?;
        export_report(&report, sink)?;
        info!(month = %month, "Report exported");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::test_support::{create_test_engine, hire};
    use crate::models::{
        AttendanceEntry, AttendanceStatus, PaymentMethod, PaymentStatus, ReportMonth, SalaryInput,
    };
    use crate::report::{SUMMARY_TABLE, TableCollector};
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn march() -> ReportMonth {
        ReportMonth::new(2024, 3).unwrap()
    }

    #[test]
    fn test_empty_store_reports_zeros() {
        let engine = create_test_engine();
        let report = engine.monthly_report(march()).unwrap();
        assert_eq!(report.summary.total_salary, Decimal::ZERO);
        assert_eq!(report.summary.attendance_rate, Decimal::ZERO);
        assert_eq!(report.summary.working_days, 21);
        assert!(report.details.salary.is_empty());
    }

    #[test]
    fn test_report_reflects_committed_writes() {
        let engine = create_test_engine();
        let employee = hire(&engine, "E001");
        engine
            .record_attendance(AttendanceEntry {
                employee_id: employee.id,
                date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                clock_in: NaiveTime::from_hms_opt(9, 0, 0),
                clock_out: NaiveTime::from_hms_opt(18, 0, 0),
                status: AttendanceStatus::Present,
                notes: None,
            })
            .unwrap();
        engine
            .create_salary(SalaryInput {
                employee_id: employee.id,
                salary_date: NaiveDate::from_ymd_opt(2024, 3, 29).unwrap(),
                base_salary: dec("5000"),
                overtime_hours: None,
                overtime_rate: None,
                bonus: Decimal::ZERO,
                allowances: Decimal::ZERO,
                deductions: Decimal::ZERO,
                payment_method: PaymentMethod::BankTransfer,
                payment_status: PaymentStatus::Pending,
                notes: None,
            })
            .unwrap();

        let report = engine.monthly_report(march()).unwrap();
        assert_eq!(report.summary.total_salary, dec("4300.00"));
        assert_eq!(report.summary.overtime_hours, dec("1"));
        assert_eq!(report.details.attendance.len(), 1);
    }

    #[test]
    fn test_export_month_writes_summary_first() {
        let engine = create_test_engine();
        let mut sink = TableCollector::new();
        engine.export_month(march(), &mut sink).unwrap();
        assert_eq!(sink.tables().len(), 4);
        assert_eq!(sink.tables()[0].name, SUMMARY_TABLE);
    }

    #[test]
    fn test_reports_fail_while_store_offline() {
        let engine = create_test_engine();
        engine.store().set_available(false);
        assert!(engine.monthly_report(march()).unwrap_err().is_retryable());
        assert!(engine.statistics(march()).unwrap_err().is_retryable());
    }
}
