//! Leave request lifecycle.
//!
//! [`LeaveWorkflow`] performs every change to a leave request together with
//! the counter maintenance the change implies, inside one store transaction.
//! A failed validation, a refused permission or a failed counter update
//! leaves the store exactly as it was.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::access::AccessContext;
use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult, EntityKind, LeaveField};
use crate::models::{
    AdjustmentKind, CountAdjustment, EmployeeId, HalfDayShift, LeaveRequest, LeaveRequestId,
    LeaveRequestStatus, NewLeaveRequest, UserId,
};
use crate::store::LeaveStore;
use crate::submission::{LeaveRequestData, LeaveRequestSubmission};

use super::{LeaveCountUpdateService, LeaveRequestService, LeaveValidation};

/// What a workflow step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    /// The request as stored after the step, or as it was before deletion.
    pub request: LeaveRequest,
    /// The validation result, for steps that validate.
    pub validation: Option<LeaveValidation>,
    /// Counter adjustments applied by the step.
    pub adjustments: Vec<CountAdjustment>,
}

impl WorkflowOutcome {
    /// Net change applied to `used` counters by this step.
    pub fn net_days(&self) -> Decimal {
        self.adjustments
            .iter()
            .map(|a| match a.kind {
                AdjustmentKind::Increment => a.days,
                AdjustmentKind::Decrement => -a.days,
            })
            .sum()
    }
}

/// Submits, edits, decides, withdraws and deletes leave requests.
///
/// # Example
///
/// ```
/// use leave_engine::access::AccessContext;
/// use leave_engine::config::EngineSettings;
/// use leave_engine::models::{Employee, LeaveRequestStatus, LeaveType, WorkShift, WorkShiftAssignment};
/// use leave_engine::services::LeaveWorkflow;
/// use leave_engine::store::{LeaveStore, MemoryStore};
/// use leave_engine::submission::LeaveRequestSubmission;
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let date = |d| NaiveDate::from_ymd_opt(2026, 6, d).unwrap();
/// let mut store = MemoryStore::new();
/// store.insert_employee(Employee::new(1, "Asha Rao", "EMP-001").with_user(10));
/// store.insert_leave_type(LeaveType {
///     id: 1,
///     name: "Casual Leave".to_string(),
///     code: "casual".to_string(),
///     yearly_grant: Decimal::from(12),
///     is_sandwich_type: false,
/// });
/// store.insert_work_shift(WorkShift {
///     id: 1,
///     name: "General".to_string(),
///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
///     weekoffs: vec!["saturday".to_string(), "sunday".to_string()],
/// });
/// store.assign_work_shift(WorkShiftAssignment {
///     employee_id: 1,
///     work_shift_id: 1,
///     start_date: date(1),
///     end_date: None,
/// });
/// let allocation = store.insert_leave_allocation(1, date(1), date(30), None).unwrap();
/// let record = store
///     .insert_allocation_record(allocation.id, 1, Decimal::from(10))
///     .unwrap();
///
/// let workflow = LeaveWorkflow::new(EngineSettings::default());
/// let employee = AccessContext::employee(10, 1);
/// let submitted = workflow
///     .submit(&mut store, &employee, &LeaveRequestSubmission::new(1, date(8), date(9)))
///     .unwrap();
/// assert_eq!(submitted.request.status, LeaveRequestStatus::Requested);
///
/// workflow
///     .decide(
///         &mut store,
///         &AccessContext::admin(1),
///         submitted.request.id,
///         LeaveRequestStatus::Approved,
///         "Enjoy",
///     )
///     .unwrap();
/// let record = store.allocation_record(record.id).unwrap().unwrap();
/// assert_eq!(record.used, Decimal::from(2));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaveWorkflow {
    settings: EngineSettings,
    counts: LeaveCountUpdateService,
}

impl LeaveWorkflow {
    /// Creates a workflow using `settings` for validation and day counts.
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            counts: LeaveCountUpdateService::new(settings),
        }
    }

    /// Validates and stores a new request in `requested` status.
    ///
    /// The acting user becomes the requester. The approver is the user of
    /// the employee's manager, when the employee has one.
    pub fn submit<S: LeaveStore>(
        &self,
        store: &mut S,
        ctx: &AccessContext,
        submission: &LeaveRequestSubmission,
    ) -> EngineResult<WorkflowOutcome> {
        store.transaction(|tx| {
            let data = LeaveRequestData::from_submission(submission, None, ctx.employee_id);
            if let Some(employee_id) = data.employee_id {
                ctx.ensure_access(employee_id, "submit leave request")?;
            }

            let validation =
                LeaveRequestService::new(&*tx, self.settings).validate_leave_request(
                    submission,
                    None,
                    ctx,
                )?;
            let employee_id = require(data.employee_id, LeaveField::EmployeeId)?;
            let leave_type_id = require(data.leave_type_id, LeaveField::LeaveTypeId)?;
            let start_date = require(data.start_date, LeaveField::StartDate)?;
            let end_date = require(data.end_date, LeaveField::EndDate)?;

            let new_request = NewLeaveRequest {
                employee_id,
                leave_type_id,
                start_date,
                end_date,
                is_half_day: data.is_half_day,
                half_day_shift: half_day_shift(submission),
                reason: submission.reason.clone(),
                alternate_arrangement: submission.alternate_arrangement.clone(),
                status: LeaveRequestStatus::Requested,
                requester_user_id: ctx.user_id,
                approver_user_id: approver_for(&*tx, employee_id)?,
            };
            let request = tx.insert_leave_request(new_request)?;
            let adjustments = self
                .counts
                .handle_leave_request_status_change(tx, &request, None)?;

            info!(
                leave_request_id = request.id,
                employee_id,
                leave_type_id,
                start_date = %start_date,
                end_date = %end_date,
                required_days = %validation.required_days,
                approver_user_id = ?request.approver_user_id,
                "Leave request submitted"
            );

            Ok(WorkflowOutcome {
                request,
                validation: Some(validation),
                adjustments,
            })
        })
    }

    /// Changes the leave type, dates or details of a `requested` request.
    ///
    /// The request's employee cannot be changed. The new values are
    /// validated with the request itself excluded from the overlap and
    /// consecutive-leave checks.
    pub fn edit<S: LeaveStore>(
        &self,
        store: &mut S,
        ctx: &AccessContext,
        request_id: LeaveRequestId,
        submission: &LeaveRequestSubmission,
    ) -> EngineResult<WorkflowOutcome> {
        store.transaction(|tx| {
            let before = load_request(&*tx, request_id)?;
            ctx.ensure_access(before.employee_id, "edit leave request")?;
            if !before.is_editable() {
                return Err(EngineError::NotEditable {
                    request_id,
                    status: before.status,
                });
            }

            let submission = LeaveRequestSubmission {
                employee_id: Some(before.employee_id),
                ..submission.clone()
            };
            let validation = LeaveRequestService::new(&*tx, self.settings)
                .validate_leave_request(&submission, Some(request_id), ctx)?;

            let after = LeaveRequest {
                leave_type_id: require(submission.leave_type_id, LeaveField::LeaveTypeId)?,
                start_date: require(submission.start_date, LeaveField::StartDate)?,
                end_date: require(submission.end_date, LeaveField::EndDate)?,
                is_half_day: submission.is_half_date,
                half_day_shift: half_day_shift(&submission),
                reason: submission.reason.clone(),
                alternate_arrangement: submission.alternate_arrangement.clone(),
                ..before.clone()
            };
            tx.update_leave_request(&after)?;
            let adjustments = self.apply_update(tx, &before, &after)?;

            info!(
                leave_request_id = request_id,
                employee_id = after.employee_id,
                start_date = %after.start_date,
                end_date = %after.end_date,
                "Leave request edited"
            );

            Ok(WorkflowOutcome {
                request: after,
                validation: Some(validation),
                adjustments,
            })
        })
    }

    /// Approves or rejects a `requested` request.
    ///
    /// Only an administrator or the request's approver may decide, and a
    /// comment is required.
    pub fn decide<S: LeaveStore>(
        &self,
        store: &mut S,
        ctx: &AccessContext,
        request_id: LeaveRequestId,
        status: LeaveRequestStatus,
        comment: &str,
    ) -> EngineResult<WorkflowOutcome> {
        store.transaction(|tx| {
            let before = load_request(&*tx, request_id)?;
            if !ctx.can_decide(&before) {
                return Err(EngineError::PermissionDenied {
                    action: format!("decide on leave request {}", request_id),
                });
            }
            if comment.trim().is_empty() {
                return Err(EngineError::EmptyField {
                    field: LeaveField::ApproverComment,
                });
            }
            let is_decision = matches!(
                status,
                LeaveRequestStatus::Approved | LeaveRequestStatus::Rejected
            );
            if !is_decision || !before.status.can_transition_to(status) {
                return Err(EngineError::InvalidStatusTransition {
                    from: before.status,
                    to: status,
                });
            }

            let after = LeaveRequest {
                status,
                approver_comment: Some(comment.trim().to_string()),
                ..before.clone()
            };
            tx.update_leave_request(&after)?;
            let adjustments = self.apply_update(tx, &before, &after)?;

            info!(
                leave_request_id = request_id,
                employee_id = after.employee_id,
                decided_by = ?ctx.user_id,
                status = %status,
                "Leave request decided"
            );

            Ok(WorkflowOutcome {
                request: after,
                validation: None,
                adjustments,
            })
        })
    }

    /// Withdraws a `requested` request on behalf of its employee.
    pub fn withdraw<S: LeaveStore>(
        &self,
        store: &mut S,
        ctx: &AccessContext,
        request_id: LeaveRequestId,
    ) -> EngineResult<WorkflowOutcome> {
        store.transaction(|tx| {
            let before = load_request(&*tx, request_id)?;
            ctx.ensure_access(before.employee_id, "withdraw leave request")?;
            if !before.status.can_transition_to(LeaveRequestStatus::Withdrawn) {
                return Err(EngineError::InvalidStatusTransition {
                    from: before.status,
                    to: LeaveRequestStatus::Withdrawn,
                });
            }

            let after = LeaveRequest {
                status: LeaveRequestStatus::Withdrawn,
                ..before.clone()
            };
            tx.update_leave_request(&after)?;
            let adjustments = self.apply_update(tx, &before, &after)?;

            info!(leave_request_id = request_id, "Leave request withdrawn");

            Ok(WorkflowOutcome {
                request: after,
                validation: None,
                adjustments,
            })
        })
    }

    /// Deletes a request, giving back its days if it was approved.
    ///
    /// Administrators may delete a request in any status; everyone else only
    /// while it is still `requested`.
    pub fn delete<S: LeaveStore>(
        &self,
        store: &mut S,
        ctx: &AccessContext,
        request_id: LeaveRequestId,
    ) -> EngineResult<WorkflowOutcome> {
        store.transaction(|tx| {
            let before = load_request(&*tx, request_id)?;
            ctx.ensure_access(before.employee_id, "delete leave request")?;
            if !ctx.is_admin() && !before.is_editable() {
                return Err(EngineError::NotEditable {
                    request_id,
                    status: before.status,
                });
            }

            let removed = tx.delete_leave_request(request_id)?;
            let adjustments = self.counts.handle_leave_request_deletion(tx, &removed)?;

            info!(
                leave_request_id = request_id,
                status = %removed.status,
                "Leave request deleted"
            );

            Ok(WorkflowOutcome {
                request: removed,
                validation: None,
                adjustments,
            })
        })
    }

    /// Runs the counter hooks for a stored change from `before` to `after`.
    fn apply_update<S: LeaveStore>(
        &self,
        store: &mut S,
        before: &LeaveRequest,
        after: &LeaveRequest,
    ) -> EngineResult<Vec<CountAdjustment>> {
        let mut adjustments = Vec::new();

        if before.status != after.status {
            adjustments.extend(self.counts.handle_leave_request_status_change(
                store,
                after,
                Some(before.status),
            )?);
        }

        let dates_changed = before.start_date != after.start_date
            || before.end_date != after.end_date
            || before.is_half_day != after.is_half_day;
        if after.status == LeaveRequestStatus::Approved && dates_changed {
            adjustments.extend(self.counts.handle_leave_request_dates_update(
                store,
                after,
                before.start_date,
                before.end_date,
                before.is_half_day,
            )?);
        }

        Ok(adjustments)
    }
}

fn load_request<S: LeaveStore>(
    store: &S,
    request_id: LeaveRequestId,
) -> EngineResult<LeaveRequest> {
    store.leave_request(request_id)?.ok_or(EngineError::NotFound {
        entity: EntityKind::LeaveRequest,
        id: request_id,
    })
}

fn require<T>(value: Option<T>, field: LeaveField) -> EngineResult<T> {
    value.ok_or(EngineError::MissingRequiredField {
        fields: vec![field],
    })
}

fn half_day_shift(submission: &LeaveRequestSubmission) -> HalfDayShift {
    if submission.is_half_date {
        submission.half_day_shift
    } else {
        HalfDayShift::NotApplicable
    }
}

/// The user of the employee's manager.
fn approver_for<S: LeaveStore>(store: &S, employee_id: EmployeeId) -> EngineResult<Option<UserId>> {
    let Some(manager_id) = store.employee(employee_id)?.and_then(|e| e.manager_id) else {
        return Ok(None);
    };
    Ok(store.employee(manager_id)?.and_then(|m| m.user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AllocationRecordId, Employee, LeaveType, WorkShift, WorkShiftAssignment,
    };
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, NaiveTime};
    use std::str::FromStr;

    fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// Employee 1 (user 10) reports to employee 2 (user 20). Both work
    /// Monday-Friday; employee 1 holds ten casual days for 2026.
    fn create_test_store() -> (MemoryStore, AllocationRecordId) {
        let mut store = MemoryStore::new();
        store.insert_employee(
            Employee::new(1, "Asha Rao", "EMP-001")
                .with_user(10)
                .with_manager(2),
        );
        store.insert_employee(Employee::new(2, "Meera Iyer", "EMP-002").with_user(20));
        store.insert_leave_type(LeaveType {
            id: 1,
            name: "Casual Leave".to_string(),
            code: "casual".to_string(),
            yearly_grant: dec("12"),
            is_sandwich_type: false,
        });
        store.insert_work_shift(WorkShift {
            id: 1,
            name: "General".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            weekoffs: vec!["saturday".to_string(), "sunday".to_string()],
        });
        for employee_id in [1, 2] {
            store.assign_work_shift(WorkShiftAssignment {
                employee_id,
                work_shift_id: 1,
                start_date: make_date(2026, 1, 1),
                end_date: None,
            });
        }
        let allocation = store
            .insert_leave_allocation(1, make_date(2026, 1, 1), make_date(2026, 12, 31), None)
            .unwrap();
        let record = store
            .insert_allocation_record(allocation.id, 1, dec("10"))
            .unwrap();
        (store, record.id)
    }

    fn employee() -> AccessContext {
        AccessContext::employee(10, 1)
    }

    fn manager() -> AccessContext {
        AccessContext::manager(20, Some(2), [1])
    }

    fn workflow() -> LeaveWorkflow {
        LeaveWorkflow::new(EngineSettings::default())
    }

    fn used(store: &MemoryStore, record_id: AllocationRecordId) -> Decimal {
        store.allocation_record(record_id).unwrap().unwrap().used
    }

    fn submit_week(store: &mut MemoryStore) -> LeaveRequest {
        workflow()
            .submit(
                store,
                &employee(),
                &LeaveRequestSubmission::new(1, make_date(2026, 6, 8), make_date(2026, 6, 12))
                    .with_reason("Family visit"),
            )
            .unwrap()
            .request
    }

    // ==========================================================================
    // Submit
    // ==========================================================================

    #[test]
    fn test_submit_assigns_requester_and_manager_approver() {
        let (mut store, record_id) = create_test_store();
        let request = submit_week(&mut store);

        assert_eq!(request.employee_id, 1);
        assert_eq!(request.status, LeaveRequestStatus::Requested);
        assert_eq!(request.requester_user_id, Some(10));
        assert_eq!(request.approver_user_id, Some(20));
        assert_eq!(request.reason.as_deref(), Some("Family visit"));
        assert_eq!(used(&store, record_id), Decimal::ZERO);
    }

    #[test]
    fn test_submit_for_other_employee_is_denied() {
        let (mut store, _) = create_test_store();
        let result = workflow().submit(
            &mut store,
            &employee(),
            &LeaveRequestSubmission::new(1, make_date(2026, 6, 8), make_date(2026, 6, 8))
                .for_employee(2),
        );
        assert!(matches!(result, Err(EngineError::PermissionDenied { .. })));
        assert!(store.leave_requests().unwrap().is_empty());
    }

    #[test]
    fn test_failed_validation_stores_nothing() {
        let (mut store, _) = create_test_store();
        submit_week(&mut store);

        let result = workflow().submit(
            &mut store,
            &employee(),
            &LeaveRequestSubmission::new(1, make_date(2026, 6, 10), make_date(2026, 6, 11)),
        );
        assert!(matches!(result, Err(EngineError::Overlap { .. })));
        assert_eq!(store.leave_requests().unwrap().len(), 1);
    }

    // ==========================================================================
    // Decide
    // ==========================================================================

    #[test]
    fn test_approval_consumes_balance() {
        let (mut store, record_id) = create_test_store();
        let request = submit_week(&mut store);

        let outcome = workflow()
            .decide(
                &mut store,
                &manager(),
                request.id,
                LeaveRequestStatus::Approved,
                "Approved",
            )
            .unwrap();

        assert_eq!(outcome.request.approver_comment.as_deref(), Some("Approved"));
        assert_eq!(outcome.net_days(), dec("5"));
        assert_eq!(used(&store, record_id), dec("5"));
    }

    #[test]
    fn test_decide_requires_approver_and_comment() {
        let (mut store, _) = create_test_store();
        let request = submit_week(&mut store);

        let by_owner = workflow().decide(
            &mut store,
            &employee(),
            request.id,
            LeaveRequestStatus::Approved,
            "Self approved",
        );
        assert!(matches!(by_owner, Err(EngineError::PermissionDenied { .. })));

        let without_comment = workflow().decide(
            &mut store,
            &manager(),
            request.id,
            LeaveRequestStatus::Rejected,
            "   ",
        );
        assert!(matches!(
            without_comment,
            Err(EngineError::EmptyField {
                field: LeaveField::ApproverComment
            })
        ));
    }

    #[test]
    fn test_decided_request_is_final() {
        let (mut store, _) = create_test_store();
        let request = submit_week(&mut store);
        workflow()
            .decide(
                &mut store,
                &manager(),
                request.id,
                LeaveRequestStatus::Rejected,
                "Team offsite",
            )
            .unwrap();

        let result = workflow().decide(
            &mut store,
            &AccessContext::admin(1),
            request.id,
            LeaveRequestStatus::Approved,
            "Changed my mind",
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidStatusTransition {
                from: LeaveRequestStatus::Rejected,
                to: LeaveRequestStatus::Approved
            })
        ));
    }

    #[test]
    fn test_failed_counter_update_rolls_back_decision() {
        let (mut store, record_id) = create_test_store();
        let request = store
            .insert_leave_request(
                NewLeaveRequest::new(1, 9, make_date(2026, 6, 8), make_date(2026, 6, 8))
                    .with_status(LeaveRequestStatus::Requested),
            )
            .unwrap();

        // Leave type 9 does not exist, so the approved day count fails.
        let result = workflow().decide(
            &mut store,
            &AccessContext::admin(1),
            request.id,
            LeaveRequestStatus::Approved,
            "Approved",
        );
        assert!(result.is_err());

        let stored = store.leave_request(request.id).unwrap().unwrap();
        assert_eq!(stored.status, LeaveRequestStatus::Requested);
        assert_eq!(stored.approver_comment, None);
        assert_eq!(used(&store, record_id), Decimal::ZERO);
    }

    // ==========================================================================
    // Edit, withdraw, delete
    // ==========================================================================

    #[test]
    fn test_edit_revalidates_excluding_itself() {
        let (mut store, _) = create_test_store();
        let request = submit_week(&mut store);

        let outcome = workflow()
            .edit(
                &mut store,
                &employee(),
                request.id,
                &LeaveRequestSubmission::new(1, make_date(2026, 6, 9), make_date(2026, 6, 12)),
            )
            .unwrap();

        assert_eq!(outcome.request.start_date, make_date(2026, 6, 9));
        assert_eq!(
            outcome.validation.map(|v| v.required_days),
            Some(dec("4"))
        );
        assert!(outcome.adjustments.is_empty());
    }

    #[test]
    fn test_approved_request_cannot_be_edited_or_withdrawn() {
        let (mut store, _) = create_test_store();
        let request = submit_week(&mut store);
        workflow()
            .decide(
                &mut store,
                &manager(),
                request.id,
                LeaveRequestStatus::Approved,
                "Approved",
            )
            .unwrap();

        let edit = workflow().edit(
            &mut store,
            &employee(),
            request.id,
            &LeaveRequestSubmission::new(1, make_date(2026, 6, 8), make_date(2026, 6, 9)),
        );
        assert!(matches!(edit, Err(EngineError::NotEditable { .. })));

        let withdraw = workflow().withdraw(&mut store, &employee(), request.id);
        assert!(matches!(
            withdraw,
            Err(EngineError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_withdraw_by_owner() {
        let (mut store, _) = create_test_store();
        let request = submit_week(&mut store);

        let outcome = workflow()
            .withdraw(&mut store, &employee(), request.id)
            .unwrap();
        assert_eq!(outcome.request.status, LeaveRequestStatus::Withdrawn);
    }

    #[test]
    fn test_admin_delete_of_approved_request_restores_balance() {
        let (mut store, record_id) = create_test_store();
        let request = submit_week(&mut store);
        workflow()
            .decide(
                &mut store,
                &manager(),
                request.id,
                LeaveRequestStatus::Approved,
                "Approved",
            )
            .unwrap();

        let by_owner = workflow().delete(&mut store, &employee(), request.id);
        assert!(matches!(by_owner, Err(EngineError::NotEditable { .. })));

        let outcome = workflow()
            .delete(&mut store, &AccessContext::admin(1), request.id)
            .unwrap();
        assert_eq!(outcome.net_days(), dec("-5"));
        assert_eq!(used(&store, record_id), Decimal::ZERO);
        assert!(store.leave_request(request.id).unwrap().is_none());
    }
}
