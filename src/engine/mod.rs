//! The write path.
//!
//! [`PayrollEngine`] runs every create, update and delete as one store
//! transaction: validate the input, derive or recompute the computed
//! fields, run the duplicate and state checks, write, commit. Any failure
//! drops the transaction, which rolls it back, so the store is never left
//! with a partial write.

mod attendance;
mod directory;
mod leave;
mod reports;
mod salary;

use std::sync::Arc;

use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, RecordId};
use crate::store::{RecordStore, StoreReader};

/// Applies payroll and attendance rules to a [`RecordStore`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use payroll_engine::config::PayrollConfig;
/// use payroll_engine::engine::PayrollEngine;
/// use payroll_engine::models::NewDepartment;
/// use payroll_engine::store::MemoryStore;
/// use rust_decimal::Decimal;
///
/// let engine = PayrollEngine::new(Arc::new(MemoryStore::new()), PayrollConfig::default());
/// let department = engine
///     .create_department(NewDepartment {
///         name: "Operations".to_string(),
///         budget: Decimal::from(120000),
///         manager_id: None,
///     })
///     .unwrap();
/// assert_eq!(department.name, "Operations");
/// ```
#[derive(Debug)]
pub struct PayrollEngine<S> {
    store: Arc<S>,
    config: PayrollConfig,
}

impl<S> Clone for PayrollEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: RecordStore> PayrollEngine<S> {
    /// Creates an engine over `store` using `config`'s tax table and
    /// attendance policy.
    pub fn new(store: Arc<S>, config: PayrollConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The configuration in use.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }
}

/// Loads the employee a record refers to. An unknown employee is an input
/// problem, not a missing resource.
fn require_employee<R: StoreReader + ?Sized>(
    reader: &R,
    employee_id: RecordId,
) -> EngineResult<Employee> {
    reader.employee(employee_id)?.ok_or_else(|| {
        EngineError::validation(
            "employee_id",
            format!("employee {} does not exist", employee_id),
        )
    })
}
