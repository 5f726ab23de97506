//! Leave validation and balance accounting services.
//!
//! This module contains the cooperating services that decide whether a leave
//! request is admissible and keep the "days used" counters on allocation
//! records consistent with approved leave.
//!
//! # Services
//!
//! - [`WorkingDayService`] - weekoff/holiday predicates and working day walks
//! - [`LeaveOverlapService`] - overlap detection against active requests
//! - [`ConsecutiveLeaveValidationService`] - same leave type on adjacent working days
//! - [`LeaveBalanceService`] - required days and remaining balance
//! - [`LeaveRequestService`] - strict and partial validation pipelines
//! - [`LeaveCountUpdateService`] - counter maintenance and reconciliation
//! - [`LeaveWorkflow`] - submit, edit, decide, withdraw and delete with the
//!   counter maintenance applied in the same transaction

mod consecutive_leave;
mod leave_balance;
mod leave_count_update;
mod leave_overlap;
mod leave_request;
mod workflow;
mod working_day;

pub use consecutive_leave::ConsecutiveLeaveValidationService;
pub use leave_balance::LeaveBalanceService;
pub use leave_count_update::{EmployeeFailure, LeaveCountUpdateService, ReconciliationReport};
pub use leave_overlap::LeaveOverlapService;
pub use leave_request::{LeaveRequestService, LeaveValidation, PartialValidation};
pub use workflow::{LeaveWorkflow, WorkflowOutcome};
pub use working_day::WorkingDayService;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{EmployeeId, LeaveConflict, LeaveRequest, WorkShift};
use crate::store::LeaveStore;

/// Name shown for a conflicting request whose leave type no longer exists.
const UNKNOWN_LEAVE_TYPE: &str = "Unknown leave type";

/// Describes an existing request for an error message.
pub(crate) fn to_conflict<S: LeaveStore>(
    store: &S,
    request: &LeaveRequest,
) -> EngineResult<LeaveConflict> {
    let leave_type_name = store
        .leave_type(request.leave_type_id)?
        .map(|lt| lt.name)
        .unwrap_or_else(|| UNKNOWN_LEAVE_TYPE.to_string());

    Ok(LeaveConflict {
        leave_request_id: request.id,
        leave_type_name,
        start_date: request.start_date,
        end_date: request.end_date,
        status: request.status,
    })
}

/// Returns the work shift that applies to a request starting on `date`.
///
/// Among the employee's assignments that have not ended before `date`, the
/// one with the latest start date wins.
pub(crate) fn applicable_work_shift<S: LeaveStore>(
    store: &S,
    employee_id: EmployeeId,
    date: NaiveDate,
) -> EngineResult<Option<WorkShift>> {
    let assignment = store
        .work_shift_assignments(employee_id)?
        .into_iter()
        .filter(|a| a.is_current_on(date))
        .max_by_key(|a| a.start_date);

    match assignment {
        Some(a) => store.work_shift(a.work_shift_id),
        None => Ok(None),
    }
}

/// Returns the shift of the employee's first assignment, ignoring its dates.
pub(crate) fn first_work_shift<S: LeaveStore>(
    store: &S,
    employee_id: EmployeeId,
) -> EngineResult<Option<WorkShift>> {
    match store.work_shift_assignments(employee_id)?.first() {
        Some(a) => store.work_shift(a.work_shift_id),
        None => Ok(None),
    }
}
