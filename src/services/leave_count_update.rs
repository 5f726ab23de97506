//! Maintenance of the `used` counters on allocation records.
//!
//! The `used` value of a [`LeaveAllocationRecord`](crate::models::LeaveAllocationRecord)
//! must always equal the days consumed by the employee's approved leave of
//! that type inside the allocation period. [`LeaveCountUpdateService`] keeps
//! it that way as requests move through their lifecycle, and can rebuild it
//! from scratch when it has drifted.
//!
//! Every event runs inside one store transaction: either all of its
//! adjustments are applied or none are.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult, EntityKind};
use crate::models::{
    AdjustmentKind, CountAdjustment, EmployeeId, LeaveRequest, LeaveRequestStatus, RecordRecount,
};
use crate::store::LeaveStore;

use super::leave_balance::calendar_days;
use super::{LeaveBalanceService, first_work_shift};

/// The dates and half-day flag a day count is computed from.
#[derive(Debug, Clone, Copy)]
struct LeaveSpan {
    start: NaiveDate,
    end: NaiveDate,
    is_half_day: bool,
}

impl LeaveSpan {
    fn of(request: &LeaveRequest) -> Self {
        Self {
            start: request.start_date,
            end: request.end_date,
            is_half_day: request.is_half_day,
        }
    }
}

/// One employee whose reconciliation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFailure {
    /// The employee.
    pub employee_id: EmployeeId,
    /// Why the reconciliation failed.
    pub message: String,
}

/// Summary of a reconciliation run over every employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Employees examined.
    pub total: usize,
    /// Employees whose counters were rebuilt.
    pub succeeded: usize,
    /// Employees whose reconciliation was rolled back.
    pub failures: Vec<EmployeeFailure>,
}

impl ReconciliationReport {
    /// Returns true if every employee was reconciled.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status for an operator command: 0 on success, 1 if any
    /// employee failed.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Applies lifecycle events to allocation record counters.
///
/// Holds only settings; every operation takes the store it writes to.
///
/// # Example
///
/// ```
/// use leave_engine::config::EngineSettings;
/// use leave_engine::models::{Employee, LeaveRequestStatus, NewLeaveRequest};
/// use leave_engine::services::LeaveCountUpdateService;
/// use leave_engine::store::{LeaveStore, MemoryStore};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let date = |d| NaiveDate::from_ymd_opt(2026, 6, d).unwrap();
/// let mut store = MemoryStore::new();
/// store.insert_employee(Employee::new(1, "Asha Rao", "EMP-001"));
/// let allocation = store
///     .insert_leave_allocation(1, date(1), date(30), None)
///     .unwrap();
/// let record = store
///     .insert_allocation_record(allocation.id, 1, Decimal::from(10))
///     .unwrap();
/// let request = store
///     .insert_leave_request(
///         NewLeaveRequest::new(1, 1, date(8), date(9)).with_status(LeaveRequestStatus::Approved),
///     )
///     .unwrap();
///
/// // Without a work shift every calendar day counts.
/// let counts = LeaveCountUpdateService::new(EngineSettings::default());
/// counts
///     .handle_leave_request_status_change(&mut store, &request, None)
///     .unwrap();
///
/// let record = store.allocation_record(record.id).unwrap().unwrap();
/// assert_eq!(record.used, Decimal::from(2));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaveCountUpdateService {
    settings: EngineSettings,
}

impl LeaveCountUpdateService {
    /// Creates a service using `settings` for day computations.
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Applies a create or status change.
    ///
    /// Subtracts the request's days if `old_status` was approved, then adds
    /// them if the current status is approved. `old_status` is `None` for a
    /// newly created request.
    pub fn handle_leave_request_status_change<S: LeaveStore>(
        &self,
        store: &mut S,
        request: &LeaveRequest,
        old_status: Option<LeaveRequestStatus>,
    ) -> EngineResult<Vec<CountAdjustment>> {
        store.transaction(|tx| {
            let mut adjustments = Vec::new();
            if old_status == Some(LeaveRequestStatus::Approved) {
                adjustments.extend(self.adjust(
                    tx,
                    request,
                    LeaveSpan::of(request),
                    AdjustmentKind::Decrement,
                )?);
            }
            if request.status == LeaveRequestStatus::Approved {
                adjustments.extend(self.adjust(
                    tx,
                    request,
                    LeaveSpan::of(request),
                    AdjustmentKind::Increment,
                )?);
            }
            Ok(adjustments)
        })
    }

    /// Applies a deletion: an approved request gives its days back.
    pub fn handle_leave_request_deletion<S: LeaveStore>(
        &self,
        store: &mut S,
        request: &LeaveRequest,
    ) -> EngineResult<Vec<CountAdjustment>> {
        if request.status != LeaveRequestStatus::Approved {
            return Ok(Vec::new());
        }
        store.transaction(|tx| {
            Ok(self
                .adjust(tx, request, LeaveSpan::of(request), AdjustmentKind::Decrement)?
                .into_iter()
                .collect())
        })
    }

    /// Rebases the counters after an approved request's dates or half-day
    /// flag changed.
    ///
    /// The days computed for the old dates are subtracted from the record
    /// covering the old dates, then the days for the current dates are added
    /// to the record covering them.
    pub fn handle_leave_request_dates_update<S: LeaveStore>(
        &self,
        store: &mut S,
        request: &LeaveRequest,
        old_start: NaiveDate,
        old_end: NaiveDate,
        old_is_half_day: bool,
    ) -> EngineResult<Vec<CountAdjustment>> {
        if request.status != LeaveRequestStatus::Approved {
            return Ok(Vec::new());
        }
        let old_span = LeaveSpan {
            start: old_start,
            end: old_end,
            is_half_day: old_is_half_day,
        };
        store.transaction(|tx| {
            let mut adjustments = Vec::new();
            adjustments.extend(self.adjust(tx, request, old_span, AdjustmentKind::Decrement)?);
            adjustments.extend(self.adjust(
                tx,
                request,
                LeaveSpan::of(request),
                AdjustmentKind::Increment,
            )?);
            Ok(adjustments)
        })
    }

    /// Rebuilds every `used` counter of an employee from their approved
    /// requests.
    ///
    /// For each record of each of the employee's allocations, `used` is
    /// overwritten with the summed days of the approved requests of the
    /// record's leave type lying fully inside the allocation period.
    ///
    /// # Returns
    ///
    /// One [`RecordRecount`] per record, or the first error, in which case
    /// no counter was changed.
    pub fn recalculate_used_counts_for_employee<S: LeaveStore>(
        &self,
        store: &mut S,
        employee_id: EmployeeId,
    ) -> EngineResult<Vec<RecordRecount>> {
        store.transaction(|tx| {
            if tx.employee(employee_id)?.is_none() {
                return Err(EngineError::NotFound {
                    entity: EntityKind::Employee,
                    id: employee_id,
                });
            }

            let approved: Vec<LeaveRequest> = tx
                .leave_requests_for(employee_id)?
                .into_iter()
                .filter(|r| r.status == LeaveRequestStatus::Approved)
                .collect();

            let mut recounts = Vec::new();
            for allocation in tx.leave_allocations_for(employee_id)? {
                for record in tx.allocation_records(allocation.id)? {
                    let matching: Vec<&LeaveRequest> = approved
                        .iter()
                        .filter(|r| r.leave_type_id == record.leave_type_id)
                        .filter(|r| allocation.contains_range(r.start_date, r.end_date))
                        .collect();

                    let mut used = Decimal::ZERO;
                    for request in &matching {
                        used += self.leave_days(&*tx, request, LeaveSpan::of(request))?;
                    }
                    tx.set_used(record.id, used)?;

                    recounts.push(RecordRecount {
                        record_id: record.id,
                        leave_allocation_id: allocation.id,
                        leave_type_id: record.leave_type_id,
                        previous_used: record.used,
                        used,
                        request_count: matching.len(),
                    });
                }
            }

            info!(
                employee_id,
                records = recounts.len(),
                changed = recounts.iter().filter(|r| r.changed()).count(),
                "Recalculated used leave counts"
            );
            Ok(recounts)
        })
    }

    /// Rebuilds the counters of every employee.
    ///
    /// Each employee is reconciled in their own transaction. A failure is
    /// recorded in the report and rolls back only that employee.
    pub fn recalculate_all<S: LeaveStore>(
        &self,
        store: &mut S,
    ) -> EngineResult<ReconciliationReport> {
        let employees = store.employees()?;
        let mut report = ReconciliationReport {
            total: employees.len(),
            ..ReconciliationReport::default()
        };

        for employee in employees {
            match self.recalculate_used_counts_for_employee(store, employee.id) {
                Ok(_) => report.succeeded += 1,
                Err(error) => {
                    warn!(
                        employee_id = employee.id,
                        employee = %employee.display_name(),
                        code = error.code(),
                        error = %error,
                        "Failed to recalculate leave counts"
                    );
                    report.failures.push(EmployeeFailure {
                        employee_id: employee.id,
                        message: error.to_string(),
                    });
                }
            }
        }

        info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failures.len(),
            "Leave count reconciliation finished"
        );
        Ok(report)
    }

    /// Applies one relative change for `request` over `span`.
    ///
    /// No-op when no allocation record covers the span or the span costs
    /// no days.
    fn adjust<S: LeaveStore>(
        &self,
        store: &mut S,
        request: &LeaveRequest,
        span: LeaveSpan,
        kind: AdjustmentKind,
    ) -> EngineResult<Option<CountAdjustment>> {
        let days = self.leave_days(&*store, request, span)?;
        let record = LeaveBalanceService::new(&*store, self.settings).allocation_record_for(
            request.employee_id,
            request.leave_type_id,
            span.start,
            span.end,
        )?;

        let Some(record) = record else {
            debug!(
                leave_request_id = request.id,
                employee_id = request.employee_id,
                start = %span.start,
                end = %span.end,
                "No allocation record covers leave request"
            );
            return Ok(None);
        };
        if days <= Decimal::ZERO {
            return Ok(None);
        }

        let used_after = match kind {
            AdjustmentKind::Increment => store.increment_used(record.id, days)?,
            AdjustmentKind::Decrement => store.decrement_used(record.id, days)?,
        };

        debug!(
            leave_request_id = request.id,
            record_id = record.id,
            kind = %kind,
            days = %days,
            used = %used_after,
            "Adjusted used leave count"
        );

        Ok(Some(CountAdjustment {
            record_id: record.id,
            leave_request_id: request.id,
            kind,
            days,
            used_after,
        }))
    }

    /// Days `request` costs over `span`.
    ///
    /// Uses the employee's first work shift assignment, whatever its dates.
    /// Without one, a half day costs the half-day value and anything else
    /// costs every calendar day.
    fn leave_days<S: LeaveStore>(
        &self,
        store: &S,
        request: &LeaveRequest,
        span: LeaveSpan,
    ) -> EngineResult<Decimal> {
        let Some(shift) = first_work_shift(store, request.employee_id)? else {
            return Ok(if span.is_half_day {
                self.settings.half_day_value
            } else {
                Decimal::from(calendar_days(span.start, span.end))
            });
        };

        let leave_type = store
            .leave_type(request.leave_type_id)?
            .ok_or(EngineError::NotFound {
                entity: EntityKind::LeaveType,
                id: request.leave_type_id,
            })?;

        LeaveBalanceService::new(store, self.settings).calculate_required_leave_days(
            span.start,
            span.end,
            &shift,
            &leave_type,
            span.is_half_day,
        )
    }
}
