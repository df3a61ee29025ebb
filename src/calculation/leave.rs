//! Leave duration and the leave request state machine.
//!
//! `total_days` is always the inclusive span of the request's dates and is
//! recomputed on every date change. A request moves one way out of
//! `pending`; once approved or rejected it accepts no further changes.

use chrono::{DateTime, Utc};
use std::fmt;

use super::inclusive_day_span;
use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveApplication, LeaveRequest, LeaveStatus, RecordId};

/// Something a caller can do to a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveAction {
    /// Change the type, dates or reason.
    Edit,
    /// Approve the request.
    Approve,
    /// Reject the request.
    Reject,
    /// Delete the request.
    Withdraw,
}

impl fmt::Display for LeaveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveAction::Edit => write!(f, "edit"),
            LeaveAction::Approve => write!(f, "approve"),
            LeaveAction::Reject => write!(f, "reject"),
            LeaveAction::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// Fails with `InvalidStateTransition` unless the request is still pending.
pub fn ensure_pending(request: &LeaveRequest, action: LeaveAction) -> EngineResult<()> {
    match request.status {
        LeaveStatus::Pending => Ok(()),
        status @ (LeaveStatus::Approved | LeaveStatus::Rejected) => {
            Err(EngineError::InvalidStateTransition {
                request_id: request.id,
                status,
                action: action.to_string(),
            })
        }
    }
}

/// Total leave days for an application.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::leave_total_days;
/// use payroll_engine::models::{LeaveApplication, LeaveType, RecordId};
/// use chrono::NaiveDate;
///
/// let application = LeaveApplication {
///     employee_id: RecordId(1),
///     leave_type: LeaveType::Annual,
///     start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
///     reason: "Holiday".to_string(),
/// };
/// assert_eq!(leave_total_days(&application).unwrap(), 5);
/// ```
pub fn leave_total_days(application: &LeaveApplication) -> EngineResult<i64> {
    inclusive_day_span(application.start_date, application.end_date)
}

fn validate_application(application: &LeaveApplication) -> EngineResult<i64> {
    if application.reason.trim().is_empty() {
        return Err(EngineError::validation("reason", "must not be empty"));
    }
    leave_total_days(application)
}

/// Builds a pending request from a validated application.
pub fn new_leave_request(
    id: RecordId,
    application: LeaveApplication,
) -> EngineResult<LeaveRequest> {
    let total_days = validate_application(&application)?;
    Ok(LeaveRequest {
        id,
        employee_id: application.employee_id,
        leave_type: application.leave_type,
        start_date: application.start_date,
        end_date: application.end_date,
        total_days,
        status: LeaveStatus::Pending,
        reason: application.reason,
        rejection_reason: None,
        approved_by: None,
        approved_at: None,
    })
}

/// Replaces the editable fields of a pending request and recomputes its
/// total days.
pub fn edit_leave_request(
    mut request: LeaveRequest,
    application: LeaveApplication,
) -> EngineResult<LeaveRequest> {
    ensure_pending(&request, LeaveAction::Edit)?;
    let total_days = validate_application(&application)?;

    request.employee_id = application.employee_id;
    request.leave_type = application.leave_type;
    request.start_date = application.start_date;
    request.end_date = application.end_date;
    request.reason = application.reason;
    request.total_days = total_days;
    Ok(request)
}

/// Approves a pending request, recording who approved it and when.
pub fn approve_leave_request(
    mut request: LeaveRequest,
    approver: &str,
    at: DateTime<Utc>,
) -> EngineResult<LeaveRequest> {
    ensure_pending(&request, LeaveAction::Approve)?;
    if approver.trim().is_empty() {
        return Err(EngineError::validation("approved_by", "must not be empty"));
    }

    request.status = LeaveStatus::Approved;
    request.approved_by = Some(approver.trim().to_string());
    request.approved_at = Some(at);
    Ok(request)
}

/// Rejects a pending request. A non-empty reason is required.
pub fn reject_leave_request(mut request: LeaveRequest, reason: &str) -> EngineResult<LeaveRequest> {
    ensure_pending(&request, LeaveAction::Reject)?;
    if reason.trim().is_empty() {
        return Err(EngineError::validation("rejection_reason", "must not be empty"));
    }

    request.status = LeaveStatus::Rejected;
    request.rejection_reason = Some(reason.trim().to_string());
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeaveType;
    use chrono::{NaiveDate, TimeZone};
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_application(start: NaiveDate, end: NaiveDate) -> LeaveApplication {
        LeaveApplication {
            employee_id: RecordId(4),
            leave_type: LeaveType::Annual,
            start_date: start,
            end_date: end,
            reason: "Family visit".to_string(),
        }
    }

    fn pending_request() -> LeaveRequest {
        new_leave_request(
            RecordId(1),
            create_test_application(date(2024, 3, 1), date(2024, 3, 5)),
        )
        .unwrap()
    }

    fn approval_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 20, 10, 30, 0).unwrap()
    }

    // ==========================================================================
    // Duration
    // ==========================================================================

    #[test]
    fn test_scenario_c_five_day_leave() {
        let request = pending_request();
        assert_eq!(request.total_days, 5);
        assert_eq!(request.status, LeaveStatus::Pending);
    }

    #[test]
    fn test_single_day_leave() {
        let application = create_test_application(date(2024, 3, 1), date(2024, 3, 1));
        assert_eq!(leave_total_days(&application).unwrap(), 1);
    }

    #[test]
    fn test_end_before_start_is_invalid_range() {
        let application = create_test_application(date(2024, 3, 5), date(2024, 3, 1));
        assert!(matches!(
            new_leave_request(RecordId(1), application),
            Err(EngineError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_empty_reason_is_rejected() {
        let mut application = create_test_application(date(2024, 3, 1), date(2024, 3, 2));
        application.reason = "   ".to_string();
        match new_leave_request(RecordId(1), application) {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "reason"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_recomputes_total_days() {
        let edited = edit_leave_request(
            pending_request(),
            create_test_application(date(2024, 2, 28), date(2024, 3, 1)),
        )
        .unwrap();
        // 2024 is a leap year
        assert_eq!(edited.total_days, 3);
        assert_eq!(edited.id, RecordId(1));
    }

    // ==========================================================================
    // State machine
    // ==========================================================================

    #[test]
    fn test_approve_records_approver_and_time() {
        let approved =
            approve_leave_request(pending_request(), "manager@example.com", approval_time())
                .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("manager@example.com"));
        assert_eq!(approved.approved_at, Some(approval_time()));
    }

    #[test]
    fn test_reject_requires_reason() {
        match reject_leave_request(pending_request(), "") {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "rejection_reason"),
            other => panic!("Expected validation error, got {:?}", other),
        }

        let rejected = reject_leave_request(pending_request(), "Peak season").unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Peak season"));
    }

    #[test]
    fn test_approved_request_cannot_be_edited_approved_or_rejected() {
        let approved = approve_leave_request(pending_request(), "lead", approval_time()).unwrap();

        let attempts = [
            edit_leave_request(
                approved.clone(),
                create_test_application(date(2024, 3, 1), date(2024, 3, 2)),
            ),
            approve_leave_request(approved.clone(), "lead", approval_time()),
            reject_leave_request(approved.clone(), "changed my mind"),
        ];

        for attempt in attempts {
            match attempt {
                Err(EngineError::InvalidStateTransition { status, .. }) => {
                    assert_eq!(status, LeaveStatus::Approved)
                }
                other => panic!("Expected InvalidStateTransition, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_rejected_request_cannot_be_withdrawn() {
        let rejected = reject_leave_request(pending_request(), "No cover").unwrap();
        let error = ensure_pending(&rejected, LeaveAction::Withdraw).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot withdraw leave request 1: it has already been rejected"
        );
    }

    proptest! {
        #[test]
        fn prop_total_days_is_inclusive_span(offset in 0i64..3650, length in 0i64..400) {
            let start = date(2020, 1, 1) + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(length);
            let application = create_test_application(start, end);
            let request = new_leave_request(RecordId(1), application).unwrap();
            prop_assert_eq!(request.total_days, length + 1);
        }
    }
}
