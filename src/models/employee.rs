//! Employee and department models.
//!
//! Employees own their attendance, leave and salary history; departments
//! group employees and may name one of them as manager.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RecordId;

/// Employment status of an employee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed and expected to work.
    #[default]
    Active,
    /// Employed but on an extended leave of absence.
    OnLeave,
    /// No longer employed. Historical records are kept.
    Terminated,
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeStatus::Active => write!(f, "active"),
            EmployeeStatus::OnLeave => write!(f, "on_leave"),
            EmployeeStatus::Terminated => write!(f, "terminated"),
        }
    }
}

/// A person employed by the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// The organization's employee code. Unique across all employees.
    pub employee_code: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
    /// Base compensation per pay run.
    pub base_salary: Decimal,
    /// The department the employee belongs to, if any.
    pub department_id: Option<RecordId>,
    /// Current employment status.
    pub status: EmployeeStatus,
}

impl Employee {
    /// Returns "first last".
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Employee, EmployeeStatus, RecordId};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: RecordId(1),
    ///     employee_code: "EMP-001".to_string(),
    ///     first_name: "Ada".to_string(),
    ///     last_name: "Lovelace".to_string(),
    ///     hire_date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
    ///     base_salary: Decimal::new(500000, 2),
    ///     department_id: None,
    ///     status: EmployeeStatus::Active,
    /// };
    /// assert_eq!(employee.full_name(), "Ada Lovelace");
    /// ```
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns true if the employee was active and already hired on `date`.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.status == EmployeeStatus::Active && self.hire_date <= date
    }
}

/// Input for hiring a new employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    /// The organization's employee code.
    pub employee_code: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
    /// Base compensation per pay run.
    pub base_salary: Decimal,
    /// The department the employee joins, if any.
    #[serde(default)]
    pub department_id: Option<RecordId>,
    /// Initial status (defaults to active).
    #[serde(default)]
    pub status: EmployeeStatus,
}

impl NewEmployee {
    /// Builds the record to persist. The store assigns the id.
    pub fn into_employee(self) -> Employee {
        Employee {
            id: RecordId::default(),
            employee_code: self.employee_code,
            first_name: self.first_name,
            last_name: self.last_name,
            hire_date: self.hire_date,
            base_salary: self.base_salary,
            department_id: self.department_id,
            status: self.status,
        }
    }
}

/// An organizational unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Department name. Unique across departments.
    pub name: String,
    /// Annual budget.
    pub budget: Decimal,
    /// Weak reference to the managing employee, used for lookup only.
    pub manager_id: Option<RecordId>,
}

/// Input for creating a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDepartment {
    /// Department name.
    pub name: String,
    /// Annual budget.
    #[serde(default)]
    pub budget: Decimal,
    /// Managing employee, if any.
    #[serde(default)]
    pub manager_id: Option<RecordId>,
}

impl NewDepartment {
    /// Builds the record to persist. The store assigns the id.
    pub fn into_department(self) -> Department {
        Department {
            id: RecordId::default(),
            name: self.name,
            budget: self.budget,
            manager_id: self.manager_id,
        }
    }
}
