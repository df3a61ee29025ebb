//! Attendance entry, correction and deletion.

use tracing::{info, warn};

use super::{PayrollEngine, require_employee};
use crate::calculation::derive_attendance;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceEntry, AttendanceRecord, RecordId};
use crate::store::{RecordStore, StoreReader, StoreTransaction, entity};

fn duplicate_attendance(entry: &AttendanceEntry) -> EngineError {
    EngineError::DuplicateAttendance {
        employee_id: entry.employee_id,
        date: entry.date,
    }
}

impl<S: RecordStore> PayrollEngine<S> {
    /// Records one day of attendance for an employee.
    ///
    /// Lateness and overtime are derived from the clock times under the
    /// configured policy. The duplicate check and the insert run in the
    /// same transaction; the store's unique (employee, date) key catches
    /// any writer that slips past the check.
    ///
    /// # Errors
    ///
    /// - `Validation` for inverted clock times or an unknown employee
    /// - `DuplicateAttendance` if the employee already has a record that day
    /// - `StoreUnavailable` if the transaction cannot complete
    pub fn record_attendance(&self, entry: AttendanceEntry) -> EngineResult<AttendanceRecord> {
        let employee_id = entry.employee_id;
        let date = entry.date;

        self.try_record_attendance(entry).inspect_err(|error| {
            warn!(%employee_id, %date, %error, "Attendance entry rejected");
        })
    }

    fn try_record_attendance(&self, entry: AttendanceEntry) -> EngineResult<AttendanceRecord> {
        let derived = derive_attendance(&entry, &self.config.attendance)?;

        let mut tx = self.store.begin()?;
        require_employee(&tx, entry.employee_id)?;
        if tx.attendance_on(entry.employee_id, entry.date)?.is_some() {
            return Err(duplicate_attendance(&entry));
        }

        let duplicate = duplicate_attendance(&entry);
        let record = tx
            .insert_attendance(derived.into_record(RecordId::default(), entry))
            .map_err(|error| match error {
                EngineError::DuplicateKey { .. } => duplicate,
                other => other,
            })?;
        tx.commit()?;

        info!(
            attendance_id = %record.id,
            employee_id = %record.employee_id,
            date = %record.date,
            status = %record.status,
            late_minutes = record.late_minutes,
            overtime_minutes = record.overtime_minutes,
            "Attendance recorded"
        );
        Ok(record)
    }

    /// Replaces an attendance record with a corrected entry, recomputing
    /// the derived fields.
    ///
    /// # Errors
    ///
    /// As [`record_attendance`](Self::record_attendance), plus `NotFound`
    /// for an unknown id. Moving a record onto a date where the employee
    /// already has another record fails with `DuplicateAttendance`.
    pub fn correct_attendance(
        &self,
        id: RecordId,
        entry: AttendanceEntry,
    ) -> EngineResult<AttendanceRecord> {
        self.try_correct_attendance(id, entry).inspect_err(|error| {
            warn!(attendance_id = %id, %error, "Attendance correction rejected");
        })
    }

    fn try_correct_attendance(
        &self,
        id: RecordId,
        entry: AttendanceEntry,
    ) -> EngineResult<AttendanceRecord> {
        let derived = derive_attendance(&entry, &self.config.attendance)?;

        let mut tx = self.store.begin()?;
        if tx.attendance(id)?.is_none() {
            return Err(EngineError::not_found(entity::ATTENDANCE, id));
        }
        require_employee(&tx, entry.employee_id)?;
        if let Some(other) = tx.attendance_on(entry.employee_id, entry.date)? {
            if other.id != id {
                return Err(duplicate_attendance(&entry));
            }
        }

        let duplicate = duplicate_attendance(&entry);
        let record = tx
            .update_attendance(derived.into_record(id, entry))
            .map_err(|error| match error {
                EngineError::DuplicateKey { .. } => duplicate,
                other => other,
            })?;
        tx.commit()?;

        info!(
            attendance_id = %record.id,
            employee_id = %record.employee_id,
            date = %record.date,
            status = %record.status,
            "Attendance corrected"
        );
        Ok(record)
    }

    /// Deletes an attendance record.
    pub fn delete_attendance(&self, id: RecordId) -> EngineResult<AttendanceRecord> {
        let result = self.store.begin().and_then(|mut tx| {
            let record = tx.delete_attendance(id)?;
            tx.commit()?;
            Ok(record)
        });

        match &result {
            Ok(record) => info!(
                attendance_id = %id,
                employee_id = %record.employee_id,
                date = %record.date,
                "Attendance deleted"
            ),
            Err(error) => warn!(attendance_id = %id, %error, "Attendance deletion failed"),
        }
        result
    }
}
