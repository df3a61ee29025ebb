//! Salary recompute.
//!
//! [`recompute`] is the single place where a salary record's derived
//! fields are produced. The write path calls it immediately before every
//! create and update, so a persisted record's `overtime_pay`, `tax` and
//! `net_salary` always agree with its inputs.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{TaxAssessment, TaxBracketTable};
use crate::error::{EngineError, EngineResult};
use crate::models::SalaryRecord;

/// Rounds a monetary amount to 2 decimal places, midpoint away from zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2)); // 12.345 -> 12.35
/// assert_eq!(round_money(Decimal::new(-12345, 3)), Decimal::new(-1235, 2));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Largest value accepted for any monetary input or overtime hour count.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Every intermediate value of a salary computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    /// Overtime hours x overtime rate, or zero.
    pub overtime_pay: Decimal,
    /// Base + overtime pay + bonus + allowances.
    pub gross: Decimal,
    /// The progressive tax assessment of `gross`.
    pub assessment: TaxAssessment,
    /// Gross - tax - deductions.
    pub net_salary: Decimal,
}

/// Computes overtime pay, gross, tax and net pay from a record's inputs.
///
/// Overtime pay is only charged when both overtime hours and rate are
/// present and positive. Each derived value is rounded to 2 decimal places
/// before it feeds the next step. Net pay may be negative when deductions
/// exceed the post-tax gross.
///
/// # Errors
///
/// Returns a `Validation` error if any monetary input is negative or
/// above [`MAX_AMOUNT`], or if overtime pay or gross leaves the
/// representable range.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_salary, TaxBracketTable};
/// use payroll_engine::models::{PaymentMethod, PaymentStatus, RecordId, SalaryInput};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record = SalaryInput {
///     employee_id: RecordId(1),
///     salary_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
///     base_salary: Decimal::from(50000),
///     overtime_hours: Some(Decimal::from(10)),
///     overtime_rate: Some(Decimal::from(100)),
///     bonus: Decimal::from(2000),
///     allowances: Decimal::ZERO,
///     deductions: Decimal::from(500),
///     payment_method: PaymentMethod::BankTransfer,
///     payment_status: PaymentStatus::Pending,
///     notes: None,
/// }
/// .into_record();
///
/// let breakdown = calculate_salary(&record, &TaxBracketTable::default()).unwrap();
/// assert_eq!(breakdown.gross, Decimal::from(53000));
/// assert_eq!(breakdown.assessment.tax, Decimal::from(10300));
/// assert_eq!(breakdown.net_salary, Decimal::from(42200));
/// ```
pub fn calculate_salary(
    record: &SalaryRecord,
    table: &TaxBracketTable,
) -> EngineResult<SalaryBreakdown> {
    validate_inputs(record)?;

    let overtime_pay = match (record.overtime_hours, record.overtime_rate) {
        (Some(hours), Some(rate)) if hours > Decimal::ZERO && rate > Decimal::ZERO => hours
            .checked_mul(rate)
            .map(round_money)
            .ok_or_else(|| out_of_range("overtime_pay"))?,
        _ => Decimal::ZERO,
    };

    let gross = [overtime_pay, record.bonus, record.allowances]
        .into_iter()
        .try_fold(record.base_salary, |total, amount| total.checked_add(amount))
        .map(round_money)
        .ok_or_else(|| out_of_range("gross"))?;
    let assessment = table.assess(gross);
    let net_salary = round_money(gross - assessment.tax - record.deductions);

    Ok(SalaryBreakdown {
        overtime_pay,
        gross,
        assessment,
        net_salary,
    })
}

/// Returns `record` with `overtime_pay`, `tax` and `net_salary` replaced by
/// freshly computed values.
///
/// Whatever derived values the input carried are discarded. Applying it
/// twice gives the same record as applying it once.
pub fn recompute(record: SalaryRecord, table: &TaxBracketTable) -> EngineResult<SalaryRecord> {
    let breakdown = calculate_salary(&record, table)?;
    Ok(SalaryRecord {
        overtime_pay: breakdown.overtime_pay,
        tax: breakdown.assessment.tax,
        net_salary: breakdown.net_salary,
        ..record
    })
}

fn validate_inputs(record: &SalaryRecord) -> EngineResult<()> {
    let amounts = [
        ("base_salary", Some(record.base_salary)),
        ("overtime_hours", record.overtime_hours),
        ("overtime_rate", record.overtime_rate),
        ("bonus", Some(record.bonus)),
        ("allowances", Some(record.allowances)),
        ("deductions", Some(record.deductions)),
    ];

    for (field, amount) in amounts {
        let Some(amount) = amount else { continue };
        if amount < Decimal::ZERO {
            return Err(EngineError::validation(
                field,
                format!("must not be negative, got {}", amount),
            ));
        }
        if amount > MAX_AMOUNT {
            return Err(EngineError::validation(
                field,
                format!("must not exceed {}, got {}", MAX_AMOUNT, amount),
            ));
        }
    }
    Ok(())
}

fn out_of_range(field: &str) -> EngineError {
    EngineError::validation(field, "result is too large to represent")
}
