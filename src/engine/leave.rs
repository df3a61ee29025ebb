//! Leave request submission, edits and decisions.

use chrono::Utc;
use tracing::{info, warn};

use super::{PayrollEngine, require_employee};
use crate::calculation::{
    LeaveAction, approve_leave_request, edit_leave_request, ensure_pending, new_leave_request,
    reject_leave_request,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveApplication, LeaveRequest, RecordId};
use crate::store::{RecordStore, StoreReader, StoreTransaction, entity};

impl<S: RecordStore> PayrollEngine<S> {
    /// Submits a leave application as a pending request.
    ///
    /// # Errors
    ///
    /// - `InvalidRange` if the end date precedes the start date
    /// - `Validation` for an empty reason or an unknown employee
    pub fn submit_leave(&self, application: LeaveApplication) -> EngineResult<LeaveRequest> {
        let employee_id = application.employee_id;

        let result = new_leave_request(RecordId::default(), application).and_then(|request| {
            let mut tx = self.store.begin()?;
            require_employee(&tx, request.employee_id)?;
            let request = tx.insert_leave_request(request)?;
            tx.commit()?;
            Ok(request)
        });

        match &result {
            Ok(request) => info!(
                leave_id = %request.id,
                %employee_id,
                leave_type = %request.leave_type,
                start = %request.start_date,
                end = %request.end_date,
                total_days = request.total_days,
                "Leave request submitted"
            ),
            Err(error) => warn!(%employee_id, %error, "Leave request rejected"),
        }
        result
    }

    /// Replaces the type, dates and reason of a pending request and
    /// recomputes its total days.
    pub fn edit_leave(
        &self,
        id: RecordId,
        application: LeaveApplication,
    ) -> EngineResult<LeaveRequest> {
        self.transition_leave(id, LeaveAction::Edit, |tx, request| {
            let edited = edit_leave_request(request, application)?;
            require_employee(tx, edited.employee_id)?;
            Ok(edited)
        })
    }

    /// Approves a pending request on behalf of `approver`.
    pub fn approve_leave(&self, id: RecordId, approver: &str) -> EngineResult<LeaveRequest> {
        self.transition_leave(id, LeaveAction::Approve, |_, request| {
            approve_leave_request(request, approver, Utc::now())
        })
    }

    /// Rejects a pending request. `reason` must not be empty.
    pub fn reject_leave(&self, id: RecordId, reason: &str) -> EngineResult<LeaveRequest> {
        self.transition_leave(id, LeaveAction::Reject, |_, request| {
            reject_leave_request(request, reason)
        })
    }

    /// Deletes a request that is still pending.
    pub fn withdraw_leave(&self, id: RecordId) -> EngineResult<LeaveRequest> {
        let result = self.store.begin().and_then(|mut tx| {
            let request = tx
                .leave_request(id)?
                .ok_or_else(|| EngineError::not_found(entity::LEAVE_REQUEST, id))?;
            ensure_pending(&request, LeaveAction::Withdraw)?;
            let request = tx.delete_leave_request(id)?;
            tx.commit()?;
            Ok(request)
        });

        match &result {
            Ok(request) => info!(
                leave_id = %id,
                employee_id = %request.employee_id,
                "Leave request withdrawn"
            ),
            Err(error) => warn!(leave_id = %id, %error, "Leave withdrawal rejected"),
        }
        result
    }

    fn transition_leave<F>(
        &self,
        id: RecordId,
        action: LeaveAction,
        apply: F,
    ) -> EngineResult<LeaveRequest>
    where
        F: FnOnce(&dyn StoreReader, LeaveRequest) -> EngineResult<LeaveRequest>,
    {
        let result = self.store.begin().and_then(|mut tx| {
            let current = tx
                .leave_request(id)?
                .ok_or_else(|| EngineError::not_found(entity::LEAVE_REQUEST, id))?;
            let updated = apply(&tx, current)?;
            let updated = tx.update_leave_request(updated)?;
            tx.commit()?;
            Ok(updated)
        });

        match &result {
            Ok(request) => info!(
                leave_id = %id,
                %action,
                status = %request.status,
                total_days = request.total_days,
                "Leave request updated"
            ),
            Err(error) => warn!(leave_id = %id, %action, %error, "Leave request change rejected"),
        }
        result
    }
}
