//! Overlap detection between a candidate range and existing leave.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeId, LeaveConflict, LeaveRequest, LeaveRequestId};
use crate::store::LeaveStore;

use super::to_conflict;

/// Detects overlap between a candidate `[start, end]` and an employee's
/// requested or approved leave.
///
/// Two inclusive ranges overlap iff `s1 <= e2 && s2 <= e1`. The request
/// passed as `exclude` (the one being edited) never conflicts with itself.
#[derive(Debug)]
pub struct LeaveOverlapService<'a, S> {
    store: &'a S,
}

impl<S> Clone for LeaveOverlapService<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for LeaveOverlapService<'_, S> {}

impl<'a, S: LeaveStore> LeaveOverlapService<'a, S> {
    /// Creates a service reading from `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns true if any active request of the employee overlaps
    /// `[start, end]`. An unknown employee has no overlaps.
    pub fn has_overlapping_leave_requests(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<LeaveRequestId>,
    ) -> EngineResult<bool> {
        if self.store.employee(employee_id)?.is_none() {
            return Ok(false);
        }
        Ok(!self
            .overlapping_requests(employee_id, start, end, exclude)?
            .is_empty())
    }

    /// Returns the overlapping requests, described for display and ordered
    /// by start date.
    pub fn overlapping_leave_requests(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<LeaveRequestId>,
    ) -> EngineResult<Vec<LeaveConflict>> {
        self.overlapping_requests(employee_id, start, end, exclude)?
            .iter()
            .map(|r| to_conflict(self.store, r))
            .collect()
    }

    /// Fails with [`EngineError::Overlap`] if any active request overlaps.
    pub fn check_overlapping_leave_requests(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<LeaveRequestId>,
    ) -> EngineResult<()> {
        let conflicts = self.overlapping_leave_requests(employee_id, start, end, exclude)?;
        if conflicts.is_empty() {
            return Ok(());
        }

        debug!(
            employee_id,
            start = %start,
            end = %end,
            conflicts = conflicts.len(),
            "Leave request overlaps existing leave"
        );
        Err(EngineError::Overlap { conflicts })
    }

    fn overlapping_requests(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<LeaveRequestId>,
    ) -> EngineResult<Vec<LeaveRequest>> {
        let mut requests: Vec<LeaveRequest> = self
            .store
            .leave_requests_for(employee_id)?
            .into_iter()
            .filter(|r| r.status.is_active())
            .filter(|r| Some(r.id) != exclude)
            .filter(|r| r.overlaps(start, end))
            .collect();
        requests.sort_by_key(|r| (r.start_date, r.id));
        Ok(requests)
    }
}
