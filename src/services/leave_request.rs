//! Leave request validation pipeline.
//!
//! [`LeaveRequestService`] is the single entry point a form layer calls to
//! decide whether a submission is admissible. It runs the checks in a fixed
//! order and stops at the first failure:
//!
//! 1. half-day requests must start and end on the same date
//! 2. required fields and date order
//! 3. employee and leave type exist
//! 4. no overlap with requested or approved leave
//! 5. an applicable work shift exists
//! 6. adjacent working days carry the same leave type
//! 7. required days fit the remaining balance
//!
//! Strict validation returns the failure as an [`EngineError`]. Partial
//! validation, used for live form feedback, never fails: every outcome is a
//! [`PartialValidation`] with a display message.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::access::AccessContext;
use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult, EntityKind, LeaveField};
use crate::models::{
    Employee, EmployeeId, LeaveConflict, LeaveRequestId, LeaveType, LeaveTypeId, WorkShift,
};
use crate::store::LeaveStore;
use crate::submission::{LeaveRequestData, LeaveRequestSubmission};

use super::{
    ConsecutiveLeaveValidationService, LeaveBalanceService, LeaveOverlapService,
    WorkingDayService, applicable_work_shift,
};

const STRICT_PASSED: &str = "Leave request validation passed.";
const PARTIAL_PASSED: &str = "Validation passed.";
const INSUFFICIENT_DATA: &str = "Insufficient data for validation.";

/// The outcome of a successful strict validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveValidation {
    /// Days the request costs.
    pub required_days: Decimal,
    /// Days remaining in the covering allocation before the request.
    pub available_days: Decimal,
}

impl LeaveValidation {
    /// Returns the display message for a passed validation.
    pub fn message(&self) -> &'static str {
        STRICT_PASSED
    }
}

/// The outcome of a partial validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialValidation {
    /// Whether every check passed.
    pub success: bool,
    /// Message to show next to the form.
    pub message: String,
    /// Days the request costs, when every check passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_days: Option<Decimal>,
    /// Days remaining in the covering allocation, when every check passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_days: Option<Decimal>,
}

impl PartialValidation {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            required_days: None,
            available_days: None,
        }
    }

    fn passed(required_days: Decimal, available_days: Decimal) -> Self {
        Self {
            success: true,
            message: PARTIAL_PASSED.to_string(),
            required_days: Some(required_days),
            available_days: Some(available_days),
        }
    }
}

/// Fields that survived the basic checks.
#[derive(Debug, Clone, Copy)]
struct CheckedData {
    employee_id: EmployeeId,
    leave_type_id: LeaveTypeId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_half_day: bool,
    exclude: Option<LeaveRequestId>,
}

/// Validates leave request submissions end to end.
///
/// # Example
///
/// ```
/// use leave_engine::access::AccessContext;
/// use leave_engine::config::EngineSettings;
/// use leave_engine::error::EngineError;
/// use leave_engine::services::LeaveRequestService;
/// use leave_engine::store::MemoryStore;
/// use leave_engine::submission::LeaveRequestSubmission;
/// use chrono::NaiveDate;
///
/// let store = MemoryStore::new();
/// let service = LeaveRequestService::new(&store, EngineSettings::default());
///
/// let submission = LeaveRequestSubmission::new(
///     1,
///     NaiveDate::from_ymd_opt(2026, 6, 12).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 6, 8).unwrap(),
/// )
/// .for_employee(1);
///
/// let result = service.validate_leave_request(&submission, None, &AccessContext::system());
/// assert!(matches!(result, Err(EngineError::InvalidDateOrder { .. })));
/// ```
#[derive(Debug)]
pub struct LeaveRequestService<'a, S> {
    store: &'a S,
    working_days: WorkingDayService<'a, S>,
    balance: LeaveBalanceService<'a, S>,
    overlap: LeaveOverlapService<'a, S>,
    consecutive: ConsecutiveLeaveValidationService<'a, S>,
}

impl<S> Clone for LeaveRequestService<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for LeaveRequestService<'_, S> {}

impl<'a, S: LeaveStore> LeaveRequestService<'a, S> {
    /// Creates the service and the collaborators it delegates to.
    pub fn new(store: &'a S, settings: EngineSettings) -> Self {
        Self {
            store,
            working_days: WorkingDayService::new(store, settings),
            balance: LeaveBalanceService::new(store, settings),
            overlap: LeaveOverlapService::new(store),
            consecutive: ConsecutiveLeaveValidationService::new(store, settings),
        }
    }

    /// Validates a submission, failing on the first violated rule.
    ///
    /// # Arguments
    ///
    /// * `submission` - The submitted form data
    /// * `exclude` - The request being edited, if any
    /// * `ctx` - The acting user; supplies the employee when the submission
    ///   names none
    ///
    /// # Returns
    ///
    /// The required and available days, or the field-scoped error of the
    /// first failing check.
    pub fn validate_leave_request(
        &self,
        submission: &LeaveRequestSubmission,
        exclude: Option<LeaveRequestId>,
        ctx: &AccessContext,
    ) -> EngineResult<LeaveValidation> {
        let validation_id = Uuid::new_v4();
        let data = LeaveRequestData::from_submission(submission, exclude, ctx.employee_id);

        debug!(
            %validation_id,
            employee_id = ?data.employee_id,
            leave_type_id = ?data.leave_type_id,
            start_date = ?data.start_date,
            end_date = ?data.end_date,
            is_half_day = data.is_half_day,
            "Validating leave request"
        );

        let result = self.run_strict(&data);
        match &result {
            Ok(validation) => info!(
                %validation_id,
                required_days = %validation.required_days,
                available_days = %validation.available_days,
                "Leave request validation passed"
            ),
            Err(error) => info!(
                %validation_id,
                code = error.code(),
                error = %error,
                "Leave request validation failed"
            ),
        }
        result
    }

    /// Validates a possibly incomplete submission for live feedback.
    ///
    /// Never fails. Incomplete data yields "Insufficient data for
    /// validation."; rule violations yield their message; storage failures
    /// and a missing work shift yield "Validation error: ..." instead of
    /// propagating.
    pub fn validate_leave_request_partial(
        &self,
        submission: &LeaveRequestSubmission,
        exclude: Option<LeaveRequestId>,
        ctx: &AccessContext,
    ) -> PartialValidation {
        let validation_id = Uuid::new_v4();
        let data = LeaveRequestData::from_submission(submission, exclude, ctx.employee_id);

        let outcome = match self.run_partial(&data) {
            Ok(outcome) => outcome,
            Err(error) => PartialValidation::failed(format!("Validation error: {}", error)),
        };

        debug!(
            %validation_id,
            success = outcome.success,
            message = %outcome.message,
            "Partial leave request validation"
        );
        outcome
    }

    fn run_strict(&self, data: &LeaveRequestData) -> EngineResult<LeaveValidation> {
        let checked = validate_basic_data(data)?;

        let employee = self.employee_or_fail(checked.employee_id)?;
        let leave_type = self.leave_type_or_fail(checked.leave_type_id)?;

        self.overlap.check_overlapping_leave_requests(
            employee.id,
            checked.start_date,
            checked.end_date,
            checked.exclude,
        )?;

        let shift = self.work_shift_or_fail(employee.id, checked.start_date)?;
        self.check_consecutive(&checked, &leave_type, &shift)?;

        let (required_days, available_days) = self.balance_for(&checked, &leave_type, &shift)?;
        if required_days > available_days {
            return Err(EngineError::InsufficientBalance {
                required: required_days,
                available: available_days,
            });
        }

        Ok(LeaveValidation {
            required_days,
            available_days,
        })
    }

    fn run_partial(&self, data: &LeaveRequestData) -> EngineResult<PartialValidation> {
        if let Some(error) = half_day_violation(data) {
            return Ok(PartialValidation::failed(error.to_string()));
        }
        if !data.has_required_fields() {
            return Ok(PartialValidation::failed(INSUFFICIENT_DATA));
        }
        let checked = match validate_basic_data(data) {
            Ok(checked) => checked,
            Err(error) => return Ok(PartialValidation::failed(error.to_string())),
        };

        let Some(employee) = self.store.employee(checked.employee_id)? else {
            return Ok(PartialValidation::failed("Employee not found."));
        };
        let Some(leave_type) = self.store.leave_type(checked.leave_type_id)? else {
            return Ok(PartialValidation::failed("Leave type not found."));
        };

        let conflicts = self.overlap.overlapping_leave_requests(
            employee.id,
            checked.start_date,
            checked.end_date,
            checked.exclude,
        )?;
        if !conflicts.is_empty() {
            return Ok(PartialValidation::failed(format!(
                "Overlapping leave found: {}",
                describe(&conflicts)
            )));
        }

        let shift = self.work_shift_or_fail(employee.id, checked.start_date)?;

        match self.check_consecutive(&checked, &leave_type, &shift) {
            Ok(()) => {}
            Err(error @ EngineError::ConsecutiveLeaveTypeConflict { .. }) => {
                let message = error
                    .field_errors()
                    .into_iter()
                    .next()
                    .map(|e| e.message)
                    .unwrap_or_else(|| error.to_string());
                return Ok(PartialValidation::failed(message));
            }
            Err(error) => return Err(error),
        }

        let (required_days, available_days) = self.balance_for(&checked, &leave_type, &shift)?;
        if required_days > available_days {
            let error = EngineError::InsufficientBalance {
                required: required_days,
                available: available_days,
            };
            return Ok(PartialValidation::failed(error.to_string()));
        }

        Ok(PartialValidation::passed(required_days, available_days))
    }

    fn employee_or_fail(&self, id: EmployeeId) -> EngineResult<Employee> {
        self.store.employee(id)?.ok_or(EngineError::NotFound {
            entity: EntityKind::Employee,
            id,
        })
    }

    fn leave_type_or_fail(&self, id: LeaveTypeId) -> EngineResult<LeaveType> {
        self.store.leave_type(id)?.ok_or(EngineError::NotFound {
            entity: EntityKind::LeaveType,
            id,
        })
    }

    fn work_shift_or_fail(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> EngineResult<WorkShift> {
        applicable_work_shift(self.store, employee_id, date)?
            .ok_or(EngineError::NoWorkShift { employee_id, date })
    }

    fn check_consecutive(
        &self,
        checked: &CheckedData,
        leave_type: &LeaveType,
        shift: &WorkShift,
    ) -> EngineResult<()> {
        self.consecutive.check_next_working_day_leave_type(
            checked.employee_id,
            checked.end_date,
            leave_type,
            shift,
            checked.exclude,
        )?;
        self.consecutive.check_previous_working_day_leave_type(
            checked.employee_id,
            checked.start_date,
            leave_type,
            shift,
            checked.exclude,
        )
    }

    fn balance_for(
        &self,
        checked: &CheckedData,
        leave_type: &LeaveType,
        shift: &WorkShift,
    ) -> EngineResult<(Decimal, Decimal)> {
        let required = self.balance.calculate_required_leave_days(
            checked.start_date,
            checked.end_date,
            shift,
            leave_type,
            checked.is_half_day,
        )?;
        let available = self.balance.available_leave_balance(
            checked.employee_id,
            leave_type.id,
            checked.start_date,
            checked.end_date,
        )?;
        Ok((required, available))
    }

    // ==========================================================================
    // Calendar and overlap helpers for callers
    // ==========================================================================

    /// See [`WorkingDayService::is_working_day`].
    pub fn is_working_day(&self, date: NaiveDate, shift: &WorkShift) -> EngineResult<bool> {
        self.working_days.is_working_day(date, shift)
    }

    /// See [`WorkingDayService::is_weekoff`].
    pub fn is_weekoff(&self, date: NaiveDate, shift: &WorkShift) -> bool {
        self.working_days.is_weekoff(date, shift)
    }

    /// See [`WorkingDayService::is_holiday`].
    pub fn is_holiday(&self, date: NaiveDate) -> EngineResult<bool> {
        self.working_days.is_holiday(date)
    }

    /// See [`WorkingDayService::next_working_day`].
    pub fn next_working_day(
        &self,
        shift: &WorkShift,
        from: Option<NaiveDate>,
    ) -> EngineResult<NaiveDate> {
        self.working_days.next_working_day(shift, from)
    }

    /// See [`WorkingDayService::previous_working_day`].
    pub fn previous_working_day(
        &self,
        shift: &WorkShift,
        from: Option<NaiveDate>,
    ) -> EngineResult<NaiveDate> {
        self.working_days.previous_working_day(shift, from)
    }

    /// See [`WorkingDayService::working_days_between`].
    pub fn working_days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        shift: &WorkShift,
    ) -> EngineResult<Vec<NaiveDate>> {
        self.working_days.working_days_between(start, end, shift)
    }

    /// See [`WorkingDayService::count_working_days_between`].
    pub fn count_working_days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        shift: &WorkShift,
    ) -> EngineResult<usize> {
        self.working_days.count_working_days_between(start, end, shift)
    }

    /// See [`WorkingDayService::working_days_count`].
    pub fn working_days_count(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        include_weekends: bool,
    ) -> EngineResult<usize> {
        self.working_days.working_days_count(start, end, include_weekends)
    }

    /// See [`LeaveOverlapService::has_overlapping_leave_requests`].
    pub fn has_overlapping_leave_requests(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<LeaveRequestId>,
    ) -> EngineResult<bool> {
        self.overlap
            .has_overlapping_leave_requests(employee_id, start, end, exclude)
    }

    /// See [`LeaveOverlapService::overlapping_leave_requests`].
    pub fn overlapping_leave_requests(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<LeaveRequestId>,
    ) -> EngineResult<Vec<LeaveConflict>> {
        self.overlap
            .overlapping_leave_requests(employee_id, start, end, exclude)
    }
}

/// The half-day error for a half-day request spanning several dates.
fn half_day_violation(data: &LeaveRequestData) -> Option<EngineError> {
    if data.has_valid_half_day_config() {
        return None;
    }
    match (data.start_date, data.end_date) {
        (Some(start_date), Some(end_date)) => Some(EngineError::InvalidHalfDayConfig {
            start_date,
            end_date,
        }),
        _ => None,
    }
}

/// Runs the field checks. The half-day check comes first so a half-day
/// request spanning several dates is reported as such whatever else is
/// wrong with it.
fn validate_basic_data(data: &LeaveRequestData) -> EngineResult<CheckedData> {
    if let Some(error) = half_day_violation(data) {
        return Err(error);
    }

    let Some(employee_id) = data.employee_id else {
        return Err(EngineError::MissingRequiredField {
            fields: vec![LeaveField::EmployeeId],
        });
    };

    let (Some(leave_type_id), Some(start_date), Some(end_date)) =
        (data.leave_type_id, data.start_date, data.end_date)
    else {
        return Err(EngineError::MissingRequiredField {
            fields: data.missing_fields(),
        });
    };

    if start_date > end_date {
        return Err(EngineError::InvalidDateOrder {
            start_date,
            end_date,
        });
    }

    Ok(CheckedData {
        employee_id,
        leave_type_id,
        start_date,
        end_date,
        is_half_day: data.is_half_day,
        exclude: data.exclude_request_id,
    })
}

fn describe(conflicts: &[LeaveConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
