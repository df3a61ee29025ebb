//! Employee and department management.

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::PayrollEngine;
use crate::error::{EngineError, EngineResult};
use crate::models::{Department, Employee, EmployeeStatus, NewDepartment, NewEmployee, RecordId};
use crate::store::{RecordStore, StoreReader, StoreTransaction, entity};

fn require_text(field: &str, value: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::validation(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(())
}

impl<S: RecordStore> PayrollEngine<S> {
    /// Hires an employee.
    ///
    /// # Errors
    ///
    /// - `Validation` for blank names or code, a negative base salary or an
    ///   unknown department
    /// - `DuplicateKey` if the employee code is taken
    pub fn hire_employee(&self, new_employee: NewEmployee) -> EngineResult<Employee> {
        let code = new_employee.employee_code.clone();

        let result = Self::validate_new_employee(&new_employee).and_then(|()| {
            let mut tx = self.store.begin()?;
            if let Some(department_id) = new_employee.department_id {
                if tx.department(department_id)?.is_none() {
                    return Err(EngineError::validation(
                        "department_id",
                        format!("department {} does not exist", department_id),
                    ));
                }
            }
            let employee = tx.insert_employee(new_employee.into_employee())?;
            tx.commit()?;
            Ok(employee)
        });

        match &result {
            Ok(employee) => info!(
                employee_id = %employee.id,
                employee_code = %employee.employee_code,
                hire_date = %employee.hire_date,
                "Employee hired"
            ),
            Err(error) => warn!(employee_code = %code, %error, "Hire rejected"),
        }
        result
    }

    fn validate_new_employee(new_employee: &NewEmployee) -> EngineResult<()> {
        require_text("employee_code", &new_employee.employee_code)?;
        require_text("first_name", &new_employee.first_name)?;
        require_text("last_name", &new_employee.last_name)?;
        require_non_negative("base_salary", new_employee.base_salary)
    }

    /// Creates a department.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank name, a negative budget or an unknown
    ///   manager
    /// - `DuplicateKey` if the name is taken
    pub fn create_department(&self, new_department: NewDepartment) -> EngineResult<Department> {
        let name = new_department.name.clone();

        let result = require_text("name", &new_department.name)
            .and_then(|()| require_non_negative("budget", new_department.budget))
            .and_then(|()| {
                let mut tx = self.store.begin()?;
                if let Some(manager_id) = new_department.manager_id {
                    if tx.employee(manager_id)?.is_none() {
                        return Err(EngineError::validation(
                            "manager_id",
                            format!("employee {} does not exist", manager_id),
                        ));
                    }
                }
                let department = tx.insert_department(new_department.into_department())?;
                tx.commit()?;
                Ok(department)
            });

        match &result {
            Ok(department) => info!(
                department_id = %department.id,
                name = %department.name,
                "Department created"
            ),
            Err(error) => warn!(name = %name, %error, "Department rejected"),
        }
        result
    }

    /// Changes an employee's status. Historical records are untouched.
    pub fn set_employee_status(
        &self,
        id: RecordId,
        status: EmployeeStatus,
    ) -> EngineResult<Employee> {
        let result = self.store.begin().and_then(|mut tx| {
            let mut employee = tx
                .employee(id)?
                .ok_or_else(|| EngineError::not_found(entity::EMPLOYEE, id))?;
            employee.status = status;
            let employee = tx.update_employee(employee)?;
            tx.commit()?;
            Ok(employee)
        });

        match &result {
            Ok(_) => info!(employee_id = %id, %status, "Employee status changed"),
            Err(error) => warn!(employee_id = %id, %error, "Status change rejected"),
        }
        result
    }
}
