//! Consecutive leave type validation.
//!
//! A leave episode must not be split across two leave types just because a
//! weekend or holiday falls inside it. The checks here walk past weekoffs and
//! holidays to the true adjacent working day and reject the candidate if that
//! day already carries active leave of a different type.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::EngineSettings;
use crate::error::{Adjacency, EngineError, EngineResult};
use crate::models::{EmployeeId, LeaveConflict, LeaveRequestId, LeaveType, WorkShift};
use crate::store::LeaveStore;

use super::{WorkingDayService, to_conflict};

/// Enforces the same leave type on adjacent working days.
#[derive(Debug)]
pub struct ConsecutiveLeaveValidationService<'a, S> {
    store: &'a S,
    working_days: WorkingDayService<'a, S>,
}

impl<S> Clone for ConsecutiveLeaveValidationService<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ConsecutiveLeaveValidationService<'_, S> {}

impl<'a, S: LeaveStore> ConsecutiveLeaveValidationService<'a, S> {
    /// Creates a service reading from `store`.
    pub fn new(store: &'a S, settings: EngineSettings) -> Self {
        Self {
            store,
            working_days: WorkingDayService::new(store, settings),
        }
    }

    /// Fails if the working day after `end_date` carries active leave of a
    /// type other than `leave_type`.
    ///
    /// # Returns
    ///
    /// [`EngineError::ConsecutiveLeaveTypeConflict`] with
    /// [`Adjacency::Next`], scoped to `end_date` and `leave_type_id`.
    pub fn check_next_working_day_leave_type(
        &self,
        employee_id: EmployeeId,
        end_date: NaiveDate,
        leave_type: &LeaveType,
        shift: &WorkShift,
        exclude: Option<LeaveRequestId>,
    ) -> EngineResult<()> {
        let next = self.working_days.next_working_day(shift, Some(end_date))?;
        self.check_adjacent_day(employee_id, next, leave_type, exclude, Adjacency::Next)
    }

    /// Fails if the working day before `start_date` carries active leave of
    /// a type other than `leave_type`.
    ///
    /// # Returns
    ///
    /// [`EngineError::ConsecutiveLeaveTypeConflict`] with
    /// [`Adjacency::Previous`], scoped to `start_date` and `leave_type_id`.
    pub fn check_previous_working_day_leave_type(
        &self,
        employee_id: EmployeeId,
        start_date: NaiveDate,
        leave_type: &LeaveType,
        shift: &WorkShift,
        exclude: Option<LeaveRequestId>,
    ) -> EngineResult<()> {
        let previous = self
            .working_days
            .previous_working_day(shift, Some(start_date))?;
        self.check_adjacent_day(employee_id, previous, leave_type, exclude, Adjacency::Previous)
    }

    fn check_adjacent_day(
        &self,
        employee_id: EmployeeId,
        adjacent_day: NaiveDate,
        leave_type: &LeaveType,
        exclude: Option<LeaveRequestId>,
        direction: Adjacency,
    ) -> EngineResult<()> {
        let conflicts = self.conflicting_requests(employee_id, adjacent_day, leave_type, exclude)?;
        if conflicts.is_empty() {
            return Ok(());
        }

        debug!(
            employee_id,
            adjacent_day = %adjacent_day,
            direction = %direction,
            leave_type = %leave_type.name,
            "Adjacent working day carries a different leave type"
        );
        Err(EngineError::ConsecutiveLeaveTypeConflict {
            direction,
            adjacent_day,
            requested_type: leave_type.name.clone(),
            conflicts,
        })
    }

    fn conflicting_requests(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
        leave_type: &LeaveType,
        exclude: Option<LeaveRequestId>,
    ) -> EngineResult<Vec<LeaveConflict>> {
        self.store
            .leave_requests_for(employee_id)?
            .iter()
            .filter(|r| r.status.is_active())
            .filter(|r| Some(r.id) != exclude)
            .filter(|r| r.covers(date))
            .filter(|r| r.leave_type_id != leave_type.id)
            .map(|r| to_conflict(self.store, r))
            .collect()
    }
}
