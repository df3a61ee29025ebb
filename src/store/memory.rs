//! In-memory transactional record store.
//!
//! Committed state lives behind an `RwLock<Arc<Tables>>`. Readers clone
//! the `Arc` and never wait on writers. A transaction holds the writer
//! mutex for its whole life, works on a private copy of the tables and
//! swaps the copy in on commit, so writers are serialized and a failed
//! transaction leaves nothing behind.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use super::{RecordStore, StoreReader, StoreTransaction, entity};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, DateRange, Department, Employee, LeaveRequest, RecordId, SalaryRecord,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    last_id: u64,
    employees: BTreeMap<RecordId, Employee>,
    departments: BTreeMap<RecordId, Department>,
    attendance: BTreeMap<RecordId, AttendanceRecord>,
    attendance_index: BTreeMap<(RecordId, NaiveDate), RecordId>,
    leave_requests: BTreeMap<RecordId, LeaveRequest>,
    salaries: BTreeMap<RecordId, SalaryRecord>,
}

impl Tables {
    fn next_id(&mut self) -> RecordId {
        self.last_id += 1;
        RecordId(self.last_id)
    }

    fn employee(&self, id: RecordId) -> Option<Employee> {
        self.employees.get(&id).cloned()
    }

    fn employees(&self) -> Vec<Employee> {
        self.employees.values().cloned().collect()
    }

    fn department(&self, id: RecordId) -> Option<Department> {
        self.departments.get(&id).cloned()
    }

    fn departments(&self) -> Vec<Department> {
        self.departments.values().cloned().collect()
    }

    fn attendance(&self, id: RecordId) -> Option<AttendanceRecord> {
        self.attendance.get(&id).cloned()
    }

    fn attendance_on(&self, employee_id: RecordId, date: NaiveDate) -> Option<AttendanceRecord> {
        self.attendance_index
            .get(&(employee_id, date))
            .and_then(|id| self.attendance.get(id))
            .cloned()
    }

    fn attendance_between(&self, range: &DateRange) -> Vec<AttendanceRecord> {
        let mut records: Vec<AttendanceRecord> = self
            .attendance
            .values()
            .filter(|record| range.contains(record.date))
            .cloned()
            .collect();
        records.sort_by_key(|record| (record.date, record.employee_id, record.id));
        records
    }

    fn leave_request(&self, id: RecordId) -> Option<LeaveRequest> {
        self.leave_requests.get(&id).cloned()
    }

    fn leave_overlapping(&self, range: &DateRange) -> Vec<LeaveRequest> {
        let mut requests: Vec<LeaveRequest> = self
            .leave_requests
            .values()
            .filter(|request| request.overlaps(range))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.id.cmp(&b.id)));
        requests
    }

    fn salary(&self, id: RecordId) -> Option<SalaryRecord> {
        self.salaries.get(&id).cloned()
    }

    fn salaries_between(&self, range: &DateRange) -> Vec<SalaryRecord> {
        let mut records: Vec<SalaryRecord> = self
            .salaries
            .values()
            .filter(|record| range.contains(record.salary_date))
            .cloned()
            .collect();
        records.sort_by_key(|record| (record.salary_date, record.employee_id, record.id));
        records
    }
}

fn duplicate(entity: &str, key: impl Into<String>) -> EngineError {
    EngineError::DuplicateKey {
        entity: entity.to_string(),
        key: key.into(),
    }
}

fn unavailable(message: &str) -> EngineError {
    EngineError::StoreUnavailable {
        message: message.to_string(),
    }
}

fn replace<T>(
    table: &mut BTreeMap<RecordId, T>,
    entity: &str,
    id: RecordId,
    value: T,
) -> EngineResult<()> {
    match table.get_mut(&id) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(EngineError::not_found(entity, id)),
    }
}

fn remove<T>(table: &mut BTreeMap<RecordId, T>, entity: &str, id: RecordId) -> EngineResult<T> {
    table
        .remove(&id)
        .ok_or_else(|| EngineError::not_found(entity, id))
}

/// A process-local [`RecordStore`].
///
/// # Example
///
/// ```
/// use payroll_engine::store::{MemoryStore, RecordStore, StoreReader, StoreTransaction};
/// use payroll_engine::models::{Department, RecordId};
/// use rust_decimal::Decimal;
///
/// let store = MemoryStore::new();
/// let mut tx = store.begin().unwrap();
/// let department = tx
///     .insert_department(Department {
///         id: RecordId::default(),
///         name: "Finance".to_string(),
///         budget: Decimal::from(250000),
///         manager_id: None,
///     })
///     .unwrap();
/// tx.commit().unwrap();
///
/// let snapshot = store.snapshot().unwrap();
/// assert_eq!(snapshot.department(department.id).unwrap().unwrap().name, "Finance");
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    committed: RwLock<Arc<Tables>>,
    writer: Mutex<()>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            committed: RwLock::new(Arc::new(Tables::default())),
            writer: Mutex::new(()),
            available: AtomicBool::new(true),
        }
    }

    /// Marks the store as reachable or not. While unavailable every
    /// snapshot, `begin` and `commit` fails with `StoreUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> EngineResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(unavailable("record store is offline"))
        }
    }

    fn committed(&self) -> EngineResult<Arc<Tables>> {
        self.committed
            .read()
            .map(|tables| Arc::clone(&*tables))
            .map_err(|_| unavailable("committed state lock poisoned"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    type Snapshot = MemorySnapshot;
    type Transaction<'a> = MemoryTransaction<'a>;

    fn snapshot(&self) -> EngineResult<MemorySnapshot> {
        self.ensure_available()?;
        Ok(MemorySnapshot {
            tables: self.committed()?,
        })
    }

    fn begin(&self) -> EngineResult<MemoryTransaction<'_>> {
        self.ensure_available()?;
        let writer = self
            .writer
            .lock()
            .map_err(|_| unavailable("writer lock poisoned"))?;
        let tables = Tables::clone(&*self.committed()?);

        Ok(MemoryTransaction {
            store: self,
            _writer: writer,
            tables,
        })
    }
}

/// A committed, immutable view of a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    tables: Arc<Tables>,
}

impl MemorySnapshot {
    fn tables(&self) -> &Tables {
        &self.tables
    }
}

/// A write transaction on a [`MemoryStore`]. Rolls back when dropped.
#[derive(Debug)]
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    _writer: MutexGuard<'a, ()>,
    tables: Tables,
}

impl MemoryTransaction<'_> {
    fn tables(&self) -> &Tables {
        &self.tables
    }
}

macro_rules! read_through_tables {
    ($($ty:ty),+) => {$(
        impl StoreReader for $ty {
            fn employee(&self, id: RecordId) -> EngineResult<Option<Employee>> {
                Ok(self.tables().employee(id))
            }

            fn employees(&self) -> EngineResult<Vec<Employee>> {
                Ok(self.tables().employees())
            }

            fn department(&self, id: RecordId) -> EngineResult<Option<Department>> {
                Ok(self.tables().department(id))
            }

            fn departments(&self) -> EngineResult<Vec<Department>> {
                Ok(self.tables().departments())
            }

            fn attendance(&self, id: RecordId) -> EngineResult<Option<AttendanceRecord>> {
                Ok(self.tables().attendance(id))
            }

            fn attendance_on(
                &self,
                employee_id: RecordId,
                date: NaiveDate,
            ) -> EngineResult<Option<AttendanceRecord>> {
                Ok(self.tables().attendance_on(employee_id, date))
            }

            fn attendance_between(&self, range: &DateRange) -> EngineResult<Vec<AttendanceRecord>> {
                Ok(self.tables().attendance_between(range))
            }

            fn leave_request(&self, id: RecordId) -> EngineResult<Option<LeaveRequest>> {
                Ok(self.tables().leave_request(id))
            }

            fn leave_overlapping(&self, range: &DateRange) -> EngineResult<Vec<LeaveRequest>> {
                Ok(self.tables().leave_overlapping(range))
            }

            fn salary(&self, id: RecordId) -> EngineResult<Option<SalaryRecord>> {
                Ok(self.tables().salary(id))
            }

            fn salaries_between(&self, range: &DateRange) -> EngineResult<Vec<SalaryRecord>> {
                Ok(self.tables().salaries_between(range))
            }
        }
    )+};
}

read_through_tables!(MemorySnapshot, MemoryTransaction<'_>);

impl StoreTransaction for MemoryTransaction<'_> {
    fn insert_employee(&mut self, mut employee: Employee) -> EngineResult<Employee> {
        let tables = &mut self.tables;
        if tables
            .employees
            .values()
            .any(|existing| existing.employee_code == employee.employee_code)
        {
            return Err(duplicate(entity::EMPLOYEE, employee.employee_code));
        }
        employee.id = tables.next_id();
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    fn update_employee(&mut self, employee: Employee) -> EngineResult<Employee> {
        let tables = &mut self.tables;
        if tables.employees.values().any(|existing| {
            existing.id != employee.id && existing.employee_code == employee.employee_code
        }) {
            return Err(duplicate(entity::EMPLOYEE, employee.employee_code));
        }
        replace(&mut tables.employees, entity::EMPLOYEE, employee.id, employee.clone())?;
        Ok(employee)
    }

    fn insert_department(&mut self, mut department: Department) -> EngineResult<Department> {
        let tables = &mut self.tables;
        if tables
            .departments
            .values()
            .any(|existing| existing.name == department.name)
        {
            return Err(duplicate(entity::DEPARTMENT, department.name));
        }
        department.id = tables.next_id();
        tables.departments.insert(department.id, department.clone());
        Ok(department)
    }

    fn insert_attendance(
        &mut self,
        mut record: AttendanceRecord,
    ) -> EngineResult<AttendanceRecord> {
        let tables = &mut self.tables;
        let key = (record.employee_id, record.date);
        if tables.attendance_index.contains_key(&key) {
            return Err(duplicate(
                entity::ATTENDANCE,
                format!("{}/{}", record.employee_id, record.date),
            ));
        }
        record.id = tables.next_id();
        tables.attendance_index.insert(key, record.id);
        tables.attendance.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_attendance(&mut self, record: AttendanceRecord) -> EngineResult<AttendanceRecord> {
        let tables = &mut self.tables;
        let previous_key = match tables.attendance.get(&record.id) {
            Some(existing) => (existing.employee_id, existing.date),
            None => return Err(EngineError::not_found(entity::ATTENDANCE, record.id)),
        };
        let key = (record.employee_id, record.date);
        if let Some(holder) = tables.attendance_index.get(&key) {
            if *holder != record.id {
                return Err(duplicate(
                    entity::ATTENDANCE,
                    format!("{}/{}", record.employee_id, record.date),
                ));
            }
        }

        tables.attendance_index.remove(&previous_key);
        tables.attendance_index.insert(key, record.id);
        tables.attendance.insert(record.id, record.clone());
        Ok(record)
    }

    fn delete_attendance(&mut self, id: RecordId) -> EngineResult<AttendanceRecord> {
        let tables = &mut self.tables;
        let record = remove(&mut tables.attendance, entity::ATTENDANCE, id)?;
        tables
            .attendance_index
            .remove(&(record.employee_id, record.date));
        Ok(record)
    }

    fn insert_leave_request(&mut self, mut request: LeaveRequest) -> EngineResult<LeaveRequest> {
        request.id = self.tables.next_id();
        self.tables.leave_requests.insert(request.id, request.clone());
        Ok(request)
    }

    fn update_leave_request(&mut self, request: LeaveRequest) -> EngineResult<LeaveRequest> {
        replace(
            &mut self.tables.leave_requests,
            entity::LEAVE_REQUEST,
            request.id,
            request.clone(),
        )?;
        Ok(request)
    }

    fn delete_leave_request(&mut self, id: RecordId) -> EngineResult<LeaveRequest> {
        remove(&mut self.tables.leave_requests, entity::LEAVE_REQUEST, id)
    }

    fn insert_salary(&mut self, mut record: SalaryRecord) -> EngineResult<SalaryRecord> {
        record.id = self.tables.next_id();
        self.tables.salaries.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_salary(&mut self, record: SalaryRecord) -> EngineResult<SalaryRecord> {
        replace(
            &mut self.tables.salaries,
            entity::SALARY,
            record.id,
            record.clone(),
        )?;
        Ok(record)
    }

    fn delete_salary(&mut self, id: RecordId) -> EngineResult<SalaryRecord> {
        remove(&mut self.tables.salaries, entity::SALARY, id)
    }

    fn commit(self) -> EngineResult<()> {
        let MemoryTransaction {
            store,
            _writer,
            tables,
        } = self;
        store.ensure_available()?;

        let mut committed = store
            .committed
            .write()
            .map_err(|_| unavailable("committed state lock poisoned"))?;
        *committed = Arc::new(tables);
        Ok(())
    }
}
