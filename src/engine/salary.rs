//! Salary record creation, update and deletion.
//!
//! Every write goes through [`recompute`] first, so the overtime pay, tax
//! and net salary stored with a record always match its inputs under the
//! engine's bracket table.

use tracing::{info, warn};

use super::{PayrollEngine, require_employee};
use crate::calculation::recompute;
use crate::error::{EngineError, EngineResult};
use crate::models::{RecordId, SalaryInput, SalaryRecord};
use crate::store::{RecordStore, StoreReader, StoreTransaction, entity};

impl<S: RecordStore> PayrollEngine<S> {
    /// Creates a salary record from its compensation inputs.
    ///
    /// # Errors
    ///
    /// - `Validation` for a negative or oversized amount, or an unknown employee
    /// - `StoreUnavailable` if the transaction cannot complete
    pub fn create_salary(&self, input: SalaryInput) -> EngineResult<SalaryRecord> {
        let employee_id = input.employee_id;

        let result = recompute(input.into_record(), &self.config.tax_brackets).and_then(|record| {
            let mut tx = self.store.begin()?;
            require_employee(&tx, record.employee_id)?;
            let record = tx.insert_salary(record)?;
            tx.commit()?;
            Ok(record)
        });

        match &result {
            Ok(record) => info!(
                salary_id = %record.id,
                %employee_id,
                salary_date = %record.salary_date,
                gross = %record.gross_salary(),
                tax = %record.tax,
                net_salary = %record.net_salary,
                "Salary record created"
            ),
            Err(error) => warn!(%employee_id, %error, "Salary record rejected"),
        }
        result
    }

    /// Replaces the inputs of a salary record and recomputes its derived
    /// fields.
    pub fn update_salary(&self, id: RecordId, input: SalaryInput) -> EngineResult<SalaryRecord> {
        let mut record = input.into_record();
        record.id = id;

        let result = recompute(record, &self.config.tax_brackets).and_then(|record| {
            let mut tx = self.store.begin()?;
            if tx.salary(id)?.is_none() {
                return Err(EngineError::not_found(entity::SALARY, id));
            }
            require_employee(&tx, record.employee_id)?;
            let record = tx.update_salary(record)?;
            tx.commit()?;
            Ok(record)
        });

        match &result {
            Ok(record) => info!(
                salary_id = %id,
                employee_id = %record.employee_id,
                tax = %record.tax,
                net_salary = %record.net_salary,
                "Salary record updated"
            ),
            Err(error) => warn!(salary_id = %id, %error, "Salary update rejected"),
        }
        result
    }

    /// Deletes a salary record.
    pub fn delete_salary(&self, id: RecordId) -> EngineResult<SalaryRecord> {
        let result = self.store.begin().and_then(|mut tx| {
            let record = tx.delete_salary(id)?;
            tx.commit()?;
            Ok(record)
        });

        match &result {
            Ok(record) => info!(
                salary_id = %id,
                employee_id = %record.employee_id,
                "Salary record deleted"
            ),
            Err(error) => warn!(salary_id = %id, %error, "Salary deletion failed"),
        }
        result
    }
}
