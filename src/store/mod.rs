//! Persistence boundary for the leave engine.
//!
//! The services never talk to a database directly. They read and write
//! through [`LeaveStore`], which a host application implements over its own
//! storage. [`MemoryStore`] is the in-process implementation used by the
//! tests, the benchmarks and embedding applications that keep state in
//! memory.
//!
//! # Transactions
//!
//! [`LeaveStore::transaction`] runs a closure against the store. Every write
//! made inside the closure commits together when it returns `Ok`, and is
//! rolled back when it returns `Err`. Nested calls behave as savepoints: an
//! inner failure rolls back only the inner writes.

mod memory;

pub use memory::MemoryStore;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{
    AllocationRecordId, Designation, Employee, EmployeeId, LeaveAllocation, LeaveAllocationId,
    LeaveAllocationRecord, LeaveRequest, LeaveRequestId, LeaveType, LeaveTypeId, NewLeaveRequest,
    UserId, WorkShift, WorkShiftAssignment, WorkShiftId,
};

/// Reads and writes the records the leave engine operates on.
///
/// Reads return owned values so implementations are free to decode rows on
/// demand. Listings are ordered by id unless stated otherwise.
pub trait LeaveStore {
    /// Looks up an employee.
    fn employee(&self, id: EmployeeId) -> EngineResult<Option<Employee>>;

    /// Lists every employee.
    fn employees(&self) -> EngineResult<Vec<Employee>>;

    /// Looks up the employee linked to a login account.
    fn employee_for_user(&self, user_id: UserId) -> EngineResult<Option<Employee>>;

    /// Lists every designation.
    fn designations(&self) -> EngineResult<Vec<Designation>>;

    /// Looks up a leave type.
    fn leave_type(&self, id: LeaveTypeId) -> EngineResult<Option<LeaveType>>;

    /// Looks up a work shift.
    fn work_shift(&self, id: WorkShiftId) -> EngineResult<Option<WorkShift>>;

    /// Lists an employee's work shift assignments in the order they were made.
    fn work_shift_assignments(
        &self,
        employee_id: EmployeeId,
    ) -> EngineResult<Vec<WorkShiftAssignment>>;

    /// Returns true if any holiday covers `date`.
    fn holiday_exists_on(&self, date: NaiveDate) -> EngineResult<bool>;

    /// Looks up a leave request.
    fn leave_request(&self, id: LeaveRequestId) -> EngineResult<Option<LeaveRequest>>;

    /// Lists every leave request.
    fn leave_requests(&self) -> EngineResult<Vec<LeaveRequest>>;

    /// Lists an employee's leave requests, in every status.
    fn leave_requests_for(&self, employee_id: EmployeeId) -> EngineResult<Vec<LeaveRequest>>;

    /// Looks up a leave allocation.
    fn leave_allocation(&self, id: LeaveAllocationId) -> EngineResult<Option<LeaveAllocation>>;

    /// Lists an employee's leave allocations.
    fn leave_allocations_for(&self, employee_id: EmployeeId)
    -> EngineResult<Vec<LeaveAllocation>>;

    /// Lists the records owned by an allocation.
    fn allocation_records(
        &self,
        allocation_id: LeaveAllocationId,
    ) -> EngineResult<Vec<LeaveAllocationRecord>>;

    /// Looks up an allocation record.
    fn allocation_record(
        &self,
        id: AllocationRecordId,
    ) -> EngineResult<Option<LeaveAllocationRecord>>;

    /// Stores a new leave request and returns it with its assigned id.
    ///
    /// Fails with `NotFound` if the employee does not exist.
    fn insert_leave_request(&mut self, request: NewLeaveRequest) -> EngineResult<LeaveRequest>;

    /// Overwrites a stored leave request.
    ///
    /// Fails with `NotFound` if no request has the given id.
    fn update_leave_request(&mut self, request: &LeaveRequest) -> EngineResult<()>;

    /// Removes a leave request and returns what was removed.
    fn delete_leave_request(&mut self, id: LeaveRequestId) -> EngineResult<LeaveRequest>;

    /// Stores a new leave allocation.
    ///
    /// Fails with `AllocationOverlap` if the period overlaps another
    /// allocation of the same employee.
    fn insert_leave_allocation(
        &mut self,
        employee_id: EmployeeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        description: Option<String>,
    ) -> EngineResult<LeaveAllocation>;

    /// Overwrites a stored leave allocation, with the same overlap rule as
    /// [`LeaveStore::insert_leave_allocation`] excluding the allocation itself.
    fn update_leave_allocation(&mut self, allocation: &LeaveAllocation) -> EngineResult<()>;

    /// Stores a new allocation record with `used` at zero.
    fn insert_allocation_record(
        &mut self,
        allocation_id: LeaveAllocationId,
        leave_type_id: LeaveTypeId,
        allotted: Decimal,
    ) -> EngineResult<LeaveAllocationRecord>;

    /// Adds `days` to a record's `used` and returns the new value.
    fn increment_used(&mut self, record_id: AllocationRecordId, days: Decimal)
    -> EngineResult<Decimal>;

    /// Subtracts `days` from a record's `used`, clamping at zero, and
    /// returns the new value.
    fn decrement_used(&mut self, record_id: AllocationRecordId, days: Decimal)
    -> EngineResult<Decimal>;

    /// Overwrites a record's `used`.
    fn set_used(&mut self, record_id: AllocationRecordId, used: Decimal) -> EngineResult<()>;

    /// Runs `f` inside a transaction.
    ///
    /// Writes made by `f` are kept if it returns `Ok` and discarded if it
    /// returns `Err`; the closure's result is returned either way.
    fn transaction<T, F>(&mut self, f: F) -> EngineResult<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> EngineResult<T>;

    /// Lists the employee's allocations that share a day with
    /// `[start_date, end_date]`, skipping `exclude`.
    fn overlapping_allocations(
        &self,
        employee_id: EmployeeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<LeaveAllocationId>,
    ) -> EngineResult<Vec<LeaveAllocation>> {
        Ok(self
            .leave_allocations_for(employee_id)?
            .into_iter()
            .filter(|a| Some(a.id) != exclude)
            .filter(|a| a.overlaps(start_date, end_date))
            .collect())
    }

    /// Returns true if [`LeaveStore::overlapping_allocations`] is non-empty.
    fn has_overlapping_allocation(
        &self,
        employee_id: EmployeeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<LeaveAllocationId>,
    ) -> EngineResult<bool> {
        Ok(!self
            .overlapping_allocations(employee_id, start_date, end_date, exclude)?
            .is_empty())
    }
}
