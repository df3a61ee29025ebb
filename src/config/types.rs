//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `payroll.yaml`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{AttendancePolicy, TaxBracket, TaxBracketTable};
use crate::error::{EngineError, EngineResult};

/// Longest standard shift the attendance policy accepts.
const MAX_STANDARD_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

/// `payroll.yaml` as written on disk, before the bracket table is validated.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollConfigFile {
    /// Progressive tax brackets in ascending order.
    pub tax_brackets: Vec<TaxBracket>,
    /// Attendance derivation rules.
    #[serde(default)]
    pub attendance: AttendancePolicy,
}

impl PayrollConfigFile {
    /// Validates the bracket table and the attendance policy and produces
    /// the runtime configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidTaxConfiguration` for a malformed bracket table
    /// - `Validation` when `standard_hours` is not in `(0, 24]`
    pub fn validate(self) -> EngineResult<PayrollConfig> {
        let standard_hours = self.attendance.standard_hours;
        if standard_hours <= Decimal::ZERO || standard_hours > MAX_STANDARD_HOURS {
            return Err(EngineError::validation(
                "attendance.standard_hours",
                format!("must be above 0 and at most 24, got {}", standard_hours),
            ));
        }

        Ok(PayrollConfig {
            tax_brackets: TaxBracketTable::new(self.tax_brackets)?,
            attendance: self.attendance,
        })
    }
}

/// Validated runtime configuration.
///
/// The bracket table and the attendance policy are explicit values handed to
/// the engine; nothing reads them from global state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PayrollConfig {
    /// The progressive tax table applied to every salary recompute.
    pub tax_brackets: TaxBracketTable,
    /// Expected clock-in time and standard shift length.
    pub attendance: AttendancePolicy,
}
