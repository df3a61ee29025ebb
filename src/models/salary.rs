//! Salary record model and related types.
//!
//! A [`SalaryInput`] carries only the compensation inputs. The derived
//! fields of a [`SalaryRecord`] (`overtime_pay`, `tax`, `net_salary`) are
//! produced by [`crate::calculation::recompute`] and cannot be supplied by a
//! caller.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RecordId;

/// How a salary is paid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Transfer to the employee's bank account.
    #[default]
    BankTransfer,
    /// Cash payment.
    Cash,
    /// Paper check.
    Check,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Check => write!(f, "check"),
        }
    }
}

/// Where a salary payment is in the payout process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet processed.
    #[default]
    Pending,
    /// Being processed.
    Processing,
    /// Paid out.
    Paid,
    /// Cancelled before payout.
    Cancelled,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Processing => write!(f, "processing"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Compensation inputs for one salary payment.
///
/// Unknown fields are rejected, so a payload carrying `tax` or
/// `net_salary` fails to deserialize instead of being silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SalaryInput {
    /// The employee being paid.
    pub employee_id: RecordId,
    /// The date of the payment.
    pub salary_date: NaiveDate,
    /// Base compensation.
    pub base_salary: Decimal,
    /// Overtime hours worked, if any.
    #[serde(default)]
    pub overtime_hours: Option<Decimal>,
    /// Pay per overtime hour, if any.
    #[serde(default)]
    pub overtime_rate: Option<Decimal>,
    /// Bonus amount.
    #[serde(default)]
    pub bonus: Decimal,
    /// Allowances amount.
    #[serde(default)]
    pub allowances: Decimal,
    /// Post-tax deductions.
    #[serde(default)]
    pub deductions: Decimal,
    /// How the salary is paid.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Payout state.
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl SalaryInput {
    /// Builds an unpersisted record with zeroed derived fields.
    ///
    /// The result must go through [`crate::calculation::recompute`] before
    /// it is written.
    pub fn into_record(self) -> SalaryRecord {
        SalaryRecord {
            id: RecordId::default(),
            employee_id: self.employee_id,
            salary_date: self.salary_date,
            base_salary: self.base_salary,
            overtime_hours: self.overtime_hours,
            overtime_rate: self.overtime_rate,
            overtime_pay: Decimal::ZERO,
            bonus: self.bonus,
            allowances: self.allowances,
            deductions: self.deductions,
            tax: Decimal::ZERO,
            net_salary: Decimal::ZERO,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            notes: self.notes,
        }
    }
}

/// A persisted salary payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// The employee being paid.
    pub employee_id: RecordId,
    /// The date of the payment.
    pub salary_date: NaiveDate,
    /// Base compensation.
    pub base_salary: Decimal,
    /// Overtime hours worked, if any.
    pub overtime_hours: Option<Decimal>,
    /// Pay per overtime hour, if any.
    pub overtime_rate: Option<Decimal>,
    /// Derived: overtime hours x overtime rate.
    pub overtime_pay: Decimal,
    /// Bonus amount.
    pub bonus: Decimal,
    /// Allowances amount.
    pub allowances: Decimal,
    /// Post-tax deductions.
    pub deductions: Decimal,
    /// Derived: progressive tax on the gross salary.
    pub tax: Decimal,
    /// Derived: gross - tax - deductions.
    pub net_salary: Decimal,
    /// How the salary is paid.
    pub payment_method: PaymentMethod,
    /// Payout state.
    pub payment_status: PaymentStatus,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl SalaryRecord {
    /// Base + overtime pay + bonus + allowances, as stored.
    pub fn gross_salary(&self) -> Decimal {
        self.base_salary + self.overtime_pay + self.bonus + self.allowances
    }
}
