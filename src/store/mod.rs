//! The record store interface.
//!
//! The engine talks to persistence through three traits:
//!
//! - [`StoreReader`]: read-only lookups and range queries. Report builders
//!   only ever see a reader, usually a committed snapshot.
//! - [`StoreTransaction`]: a reader plus writes, made visible all at once by
//!   [`StoreTransaction::commit`]. Dropping a transaction without
//!   committing rolls it back.
//! - [`RecordStore`]: the factory for snapshots and transactions.
//!
//! Unique keys are enforced by the store inside the transaction: a second
//! attendance record for the same (employee, date), a repeated employee code
//! or a repeated department name fail with `DuplicateKey`.

mod memory;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, DateRange, Department, Employee, LeaveRequest, RecordId, SalaryRecord,
};

pub use memory::{MemorySnapshot, MemoryStore, MemoryTransaction};

/// Entity names used in `DuplicateKey` and `NotFound` errors.
pub mod entity {
    /// Employees.
    pub const EMPLOYEE: &str = "employee";
    /// Departments.
    pub const DEPARTMENT: &str = "department";
    /// Attendance records.
    pub const ATTENDANCE: &str = "attendance record";
    /// Leave requests.
    pub const LEAVE_REQUEST: &str = "leave request";
    /// Salary records.
    pub const SALARY: &str = "salary record";
}

/// Read-only access to persisted records.
///
/// Range queries return records in a stable order so reports and exports
/// are reproducible.
pub trait StoreReader {
    /// Looks up an employee by id.
    fn employee(&self, id: RecordId) -> EngineResult<Option<Employee>>;

    /// Every employee, ordered by id.
    fn employees(&self) -> EngineResult<Vec<Employee>>;

    /// Looks up a department by id.
    fn department(&self, id: RecordId) -> EngineResult<Option<Department>>;

    /// Every department, ordered by id.
    fn departments(&self) -> EngineResult<Vec<Department>>;

    /// Looks up an attendance record by id.
    fn attendance(&self, id: RecordId) -> EngineResult<Option<AttendanceRecord>>;

    /// Looks up the attendance record for an employee on a date.
    fn attendance_on(
        &self,
        employee_id: RecordId,
        date: NaiveDate,
    ) -> EngineResult<Option<AttendanceRecord>>;

    /// Attendance records dated inside `range`, ordered by date then employee.
    fn attendance_between(&self, range: &DateRange) -> EngineResult<Vec<AttendanceRecord>>;

    /// Looks up a leave request by id.
    fn leave_request(&self, id: RecordId) -> EngineResult<Option<LeaveRequest>>;

    /// Leave requests whose interval overlaps `range`, newest start first.
    fn leave_overlapping(&self, range: &DateRange) -> EngineResult<Vec<LeaveRequest>>;

    /// Looks up a salary record by id.
    fn salary(&self, id: RecordId) -> EngineResult<Option<SalaryRecord>>;

    /// Salary records dated inside `range`, ordered by date then employee.
    fn salaries_between(&self, range: &DateRange) -> EngineResult<Vec<SalaryRecord>>;
}

/// A unit of work against the store.
///
/// Inserts ignore the id carried by the record and assign a fresh one.
/// Updates and deletes fail with `NotFound` for unknown ids.
pub trait StoreTransaction: StoreReader {
    /// Inserts an employee. Fails with `DuplicateKey` on a repeated code.
    fn insert_employee(&mut self, employee: Employee) -> EngineResult<Employee>;

    /// Replaces an employee.
    fn update_employee(&mut self, employee: Employee) -> EngineResult<Employee>;

    /// Inserts a department. Fails with `DuplicateKey` on a repeated name.
    fn insert_department(&mut self, department: Department) -> EngineResult<Department>;

    /// Inserts an attendance record. Fails with `DuplicateKey` if the
    /// employee already has a record on that date.
    fn insert_attendance(&mut self, record: AttendanceRecord) -> EngineResult<AttendanceRecord>;

    /// Replaces an attendance record. Fails with `DuplicateKey` if another
    /// record already holds the new (employee, date) pair.
    fn update_attendance(&mut self, record: AttendanceRecord) -> EngineResult<AttendanceRecord>;

    /// Removes an attendance record, returning it.
    fn delete_attendance(&mut self, id: RecordId) -> EngineResult<AttendanceRecord>;

    /// Inserts a leave request.
    fn insert_leave_request(&mut self, request: LeaveRequest) -> EngineResult<LeaveRequest>;

    /// Replaces a leave request.
    fn update_leave_request(&mut self, request: LeaveRequest) -> EngineResult<LeaveRequest>;

    /// Removes a leave request, returning it.
    fn delete_leave_request(&mut self, id: RecordId) -> EngineResult<LeaveRequest>;

    /// Inserts a salary record.
    fn insert_salary(&mut self, record: SalaryRecord) -> EngineResult<SalaryRecord>;

    /// Replaces a salary record.
    fn update_salary(&mut self, record: SalaryRecord) -> EngineResult<SalaryRecord>;

    /// Removes a salary record, returning it.
    fn delete_salary(&mut self, id: RecordId) -> EngineResult<SalaryRecord>;

    /// Makes every write of the transaction visible atomically.
    fn commit(self) -> EngineResult<()>
    where
        Self: Sized;

    /// Discards every write of the transaction.
    fn rollback(self)
    where
        Self: Sized,
    {
    }
}

/// A transactional record store.
pub trait RecordStore: Send + Sync {
    /// A consistent read-only view of committed data.
    type Snapshot: StoreReader;

    /// A write transaction borrowing the store.
    type Transaction<'a>: StoreTransaction
    where
        Self: 'a;

    /// Returns a view of the most recently committed state. Never blocks
    /// on writers.
    fn snapshot(&self) -> EngineResult<Self::Snapshot>;

    /// Starts a transaction. Writers are serialized: a second `begin`
    /// waits until the first transaction commits or rolls back.
    fn begin(&self) -> EngineResult<Self::Transaction<'_>>;
}
