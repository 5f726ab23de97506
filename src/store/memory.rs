//! In-memory [`LeaveStore`] implementation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, EntityKind};
use crate::models::{
    AllocationRecordId, Designation, DesignationId, Employee, EmployeeId, Holiday, HolidayId,
    LeaveAllocation, LeaveAllocationId, LeaveAllocationRecord, LeaveRequest, LeaveRequestId,
    LeaveType, LeaveTypeId, NewLeaveRequest, UserId, WorkShift, WorkShiftAssignment, WorkShiftId,
};

use super::LeaveStore;

#[derive(Debug, Clone, Default)]
struct Tables {
    employees: BTreeMap<EmployeeId, Employee>,
    designations: BTreeMap<DesignationId, Designation>,
    leave_types: BTreeMap<LeaveTypeId, LeaveType>,
    work_shifts: BTreeMap<WorkShiftId, WorkShift>,
    assignments: Vec<WorkShiftAssignment>,
    holidays: BTreeMap<HolidayId, Holiday>,
    leave_requests: BTreeMap<LeaveRequestId, LeaveRequest>,
    allocations: BTreeMap<LeaveAllocationId, LeaveAllocation>,
    records: BTreeMap<AllocationRecordId, LeaveAllocationRecord>,
    next_request_id: LeaveRequestId,
    next_allocation_id: LeaveAllocationId,
    next_record_id: AllocationRecordId,
}

/// A [`LeaveStore`] that keeps every table in memory.
///
/// Transactions snapshot the tables on entry and restore the snapshot when
/// the closure fails. Writers need `&mut` access, so two submissions can
/// never interleave against the same store.
///
/// Foreign keys are only checked where the engine relies on them: requests
/// and allocations need an existing employee, records need an existing
/// allocation.
///
/// # Example
///
/// ```
/// use leave_engine::models::Employee;
/// use leave_engine::store::{LeaveStore, MemoryStore};
/// use chrono::NaiveDate;
///
/// let mut store = MemoryStore::new();
/// store.insert_employee(Employee::new(1, "Asha Rao", "EMP-001"));
///
/// let allocation = store
///     .insert_leave_allocation(
///         1,
///         NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
///         None,
///     )
///     .unwrap();
/// assert_eq!(store.leave_allocations_for(1).unwrap(), vec![allocation]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Tables,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the leave types, work shifts and
    /// holidays of a loaded configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut store = Self::new();
        for leave_type in config.leave_types() {
            store.insert_leave_type(leave_type.clone());
        }
        for shift in config.work_shifts() {
            store.insert_work_shift(shift.clone());
        }
        for holiday in config.holidays() {
            store.insert_holiday(holiday.clone());
        }
        store
    }

    /// Adds or replaces an employee.
    pub fn insert_employee(&mut self, employee: Employee) {
        self.tables.employees.insert(employee.id, employee);
    }

    /// Adds or replaces a designation.
    pub fn insert_designation(&mut self, designation: Designation) {
        self.tables.designations.insert(designation.id, designation);
    }

    /// Adds or replaces a leave type.
    pub fn insert_leave_type(&mut self, leave_type: LeaveType) {
        self.tables.leave_types.insert(leave_type.id, leave_type);
    }

    /// Adds or replaces a work shift.
    pub fn insert_work_shift(&mut self, shift: WorkShift) {
        self.tables.work_shifts.insert(shift.id, shift);
    }

    /// Records a work shift assignment.
    pub fn assign_work_shift(&mut self, assignment: WorkShiftAssignment) {
        self.tables.assignments.push(assignment);
    }

    /// Adds or replaces a holiday.
    pub fn insert_holiday(&mut self, holiday: Holiday) {
        self.tables.holidays.insert(holiday.id, holiday);
    }

    fn record_mut(
        &mut self,
        record_id: AllocationRecordId,
    ) -> EngineResult<&mut LeaveAllocationRecord> {
        self.tables
            .records
            .get_mut(&record_id)
            .ok_or(EngineError::NotFound {
                entity: EntityKind::LeaveAllocationRecord,
                id: record_id,
            })
    }

    fn ensure_employee(&self, employee_id: EmployeeId) -> EngineResult<()> {
        if self.tables.employees.contains_key(&employee_id) {
            Ok(())
        } else {
            Err(EngineError::NotFound {
                entity: EntityKind::Employee,
                id: employee_id,
            })
        }
    }

    fn ensure_no_allocation_overlap(
        &self,
        employee_id: EmployeeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<LeaveAllocationId>,
    ) -> EngineResult<()> {
        if self.has_overlapping_allocation(employee_id, start_date, end_date, exclude)? {
            return Err(EngineError::AllocationOverlap {
                employee_id,
                start_date,
                end_date,
            });
        }
        Ok(())
    }
}

impl LeaveStore for MemoryStore {
    fn employee(&self, id: EmployeeId) -> EngineResult<Option<Employee>> {
        Ok(self.tables.employees.get(&id).cloned())
    }

    fn employees(&self) -> EngineResult<Vec<Employee>> {
        Ok(self.tables.employees.values().cloned().collect())
    }

    fn employee_for_user(&self, user_id: UserId) -> EngineResult<Option<Employee>> {
        Ok(self
            .tables
            .employees
            .values()
            .find(|e| e.user_id == Some(user_id))
            .cloned())
    }

    fn designations(&self) -> EngineResult<Vec<Designation>> {
        Ok(self.tables.designations.values().cloned().collect())
    }

    fn leave_type(&self, id: LeaveTypeId) -> EngineResult<Option<LeaveType>> {
        Ok(self.tables.leave_types.get(&id).cloned())
    }

    fn work_shift(&self, id: WorkShiftId) -> EngineResult<Option<WorkShift>> {
        Ok(self.tables.work_shifts.get(&id).cloned())
    }

    fn work_shift_assignments(
        &self,
        employee_id: EmployeeId,
    ) -> EngineResult<Vec<WorkShiftAssignment>> {
        Ok(self
            .tables
            .assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn holiday_exists_on(&self, date: NaiveDate) -> EngineResult<bool> {
        Ok(self.tables.holidays.values().any(|h| h.covers(date)))
    }

    fn leave_request(&self, id: LeaveRequestId) -> EngineResult<Option<LeaveRequest>> {
        Ok(self.tables.leave_requests.get(&id).cloned())
    }

    fn leave_requests(&self) -> EngineResult<Vec<LeaveRequest>> {
        Ok(self.tables.leave_requests.values().cloned().collect())
    }

    fn leave_requests_for(&self, employee_id: EmployeeId) -> EngineResult<Vec<LeaveRequest>> {
        Ok(self
            .tables
            .leave_requests
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn leave_allocation(&self, id: LeaveAllocationId) -> EngineResult<Option<LeaveAllocation>> {
        Ok(self.tables.allocations.get(&id).cloned())
    }

    fn leave_allocations_for(
        &self,
        employee_id: EmployeeId,
    ) -> EngineResult<Vec<LeaveAllocation>> {
        Ok(self
            .tables
            .allocations
            .values()
            .filter(|a| a.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn allocation_records(
        &self,
        allocation_id: LeaveAllocationId,
    ) -> EngineResult<Vec<LeaveAllocationRecord>> {
        Ok(self
            .tables
            .records
            .values()
            .filter(|r| r.leave_allocation_id == allocation_id)
            .cloned()
            .collect())
    }

    fn allocation_record(
        &self,
        id: AllocationRecordId,
    ) -> EngineResult<Option<LeaveAllocationRecord>> {
        Ok(self.tables.records.get(&id).cloned())
    }

    fn insert_leave_request(&mut self, request: NewLeaveRequest) -> EngineResult<LeaveRequest> {
        self.ensure_employee(request.employee_id)?;
        self.tables.next_request_id += 1;
        let stored = request.into_request(self.tables.next_request_id);
        self.tables.leave_requests.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_leave_request(&mut self, request: &LeaveRequest) -> EngineResult<()> {
        let slot = self
            .tables
            .leave_requests
            .get_mut(&request.id)
            .ok_or(EngineError::NotFound {
                entity: EntityKind::LeaveRequest,
                id: request.id,
            })?;
        *slot = request.clone();
        Ok(())
    }

    fn delete_leave_request(&mut self, id: LeaveRequestId) -> EngineResult<LeaveRequest> {
        self.tables
            .leave_requests
            .remove(&id)
            .ok_or(EngineError::NotFound {
                entity: EntityKind::LeaveRequest,
                id,
            })
    }

    fn insert_leave_allocation(
        &mut self,
        employee_id: EmployeeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        description: Option<String>,
    ) -> EngineResult<LeaveAllocation> {
        self.ensure_employee(employee_id)?;
        if start_date > end_date {
            return Err(EngineError::InvalidDateOrder {
                start_date,
                end_date,
            });
        }
        self.ensure_no_allocation_overlap(employee_id, start_date, end_date, None)?;

        self.tables.next_allocation_id += 1;
        let allocation = LeaveAllocation {
            id: self.tables.next_allocation_id,
            employee_id,
            start_date,
            end_date,
            description,
        };
        self.tables
            .allocations
            .insert(allocation.id, allocation.clone());
        Ok(allocation)
    }

    fn update_leave_allocation(&mut self, allocation: &LeaveAllocation) -> EngineResult<()> {
        if !self.tables.allocations.contains_key(&allocation.id) {
            return Err(EngineError::NotFound {
                entity: EntityKind::LeaveAllocation,
                id: allocation.id,
            });
        }
        if allocation.start_date > allocation.end_date {
            return Err(EngineError::InvalidDateOrder {
                start_date: allocation.start_date,
                end_date: allocation.end_date,
            });
        }
        self.ensure_no_allocation_overlap(
            allocation.employee_id,
            allocation.start_date,
            allocation.end_date,
            Some(allocation.id),
        )?;
        self.tables
            .allocations
            .insert(allocation.id, allocation.clone());
        Ok(())
    }

    fn insert_allocation_record(
        &mut self,
        allocation_id: LeaveAllocationId,
        leave_type_id: LeaveTypeId,
        allotted: Decimal,
    ) -> EngineResult<LeaveAllocationRecord> {
        if !self.tables.allocations.contains_key(&allocation_id) {
            return Err(EngineError::NotFound {
                entity: EntityKind::LeaveAllocation,
                id: allocation_id,
            });
        }
        self.tables.next_record_id += 1;
        let record = LeaveAllocationRecord {
            id: self.tables.next_record_id,
            leave_allocation_id: allocation_id,
            leave_type_id,
            allotted,
            used: Decimal::ZERO,
        };
        self.tables.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn increment_used(
        &mut self,
        record_id: AllocationRecordId,
        days: Decimal,
    ) -> EngineResult<Decimal> {
        let record = self.record_mut(record_id)?;
        record.used += days;
        Ok(record.used)
    }

    fn decrement_used(
        &mut self,
        record_id: AllocationRecordId,
        days: Decimal,
    ) -> EngineResult<Decimal> {
        let record = self.record_mut(record_id)?;
        record.used = (record.used - days).max(Decimal::ZERO);
        Ok(record.used)
    }

    fn set_used(&mut self, record_id: AllocationRecordId, used: Decimal) -> EngineResult<()> {
        self.record_mut(record_id)?.used = used;
        Ok(())
    }

    fn transaction<T, F>(&mut self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Self) -> EngineResult<T>,
    {
        let snapshot = self.tables.clone();
        let result = f(self);
        if result.is_err() {
            self.tables = snapshot;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_employee(Employee::new(1, "Asha Rao", "EMP-001"));
        store.insert_employee(Employee::new(2, "Ravi Kumar", "EMP-002"));
        store
    }

    fn year_allocation(store: &mut MemoryStore, employee_id: EmployeeId) -> LeaveAllocation {
        store
            .insert_leave_allocation(
                employee_id,
                make_date(2026, 1, 1),
                make_date(2026, 12, 31),
                None,
            )
            .unwrap()
    }

    #[test]
    fn test_insert_leave_request_assigns_sequential_ids() {
        let mut store = create_test_store();
        let first = store
            .insert_leave_request(NewLeaveRequest::new(1, 1, make_date(2026, 3, 2), make_date(2026, 3, 2)))
            .unwrap();
        let second = store
            .insert_leave_request(NewLeaveRequest::new(1, 1, make_date(2026, 3, 9), make_date(2026, 3, 9)))
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.leave_requests_for(1).unwrap().len(), 2);
    }

    #[test]
    fn test_insert_leave_request_for_unknown_employee_fails() {
        let mut store = create_test_store();
        let result = store.insert_leave_request(NewLeaveRequest::new(
            99,
            1,
            make_date(2026, 3, 2),
            make_date(2026, 3, 2),
        ));
        assert!(matches!(
            result,
            Err(EngineError::NotFound {
                entity: EntityKind::Employee,
                id: 99
            })
        ));
    }

    #[test]
    fn test_overlapping_allocation_is_rejected() {
        let mut store = create_test_store();
        year_allocation(&mut store, 1);

        let result =
            store.insert_leave_allocation(1, make_date(2026, 12, 1), make_date(2027, 11, 30), None);
        assert!(matches!(result, Err(EngineError::AllocationOverlap { .. })));
    }

    #[test]
    fn test_allocations_of_other_employees_do_not_conflict() {
        let mut store = create_test_store();
        year_allocation(&mut store, 1);
        year_allocation(&mut store, 2);
        assert_eq!(store.leave_allocations_for(2).unwrap().len(), 1);
    }

    #[test]
    fn test_updating_allocation_excludes_itself_from_overlap() {
        let mut store = create_test_store();
        let mut allocation = year_allocation(&mut store, 1);
        allocation.end_date = make_date(2027, 3, 31);
        assert!(store.update_leave_allocation(&allocation).is_ok());
        assert!(
            !store
                .has_overlapping_allocation(1, allocation.start_date, allocation.end_date, Some(allocation.id))
                .unwrap()
        );
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut store = create_test_store();
        let allocation = year_allocation(&mut store, 1);
        let record = store
            .insert_allocation_record(allocation.id, 1, dec("12"))
            .unwrap();

        assert_eq!(store.increment_used(record.id, dec("1.5")).unwrap(), dec("1.5"));
        assert_eq!(store.decrement_used(record.id, dec("4")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_failed_transaction_rolls_back_every_write() {
        let mut store = create_test_store();
        let allocation = year_allocation(&mut store, 1);
        let record = store
            .insert_allocation_record(allocation.id, 1, dec("12"))
            .unwrap();

        let result: EngineResult<()> = store.transaction(|tx| {
            tx.increment_used(record.id, dec("3"))?;
            tx.insert_leave_request(NewLeaveRequest::new(
                1,
                1,
                make_date(2026, 3, 2),
                make_date(2026, 3, 4),
            ))?;
            Err(EngineError::Storage {
                message: "disk full".to_string(),
            })
        });

        assert!(result.is_err());
        assert_eq!(store.allocation_record(record.id).unwrap().unwrap().used, Decimal::ZERO);
        assert!(store.leave_requests_for(1).unwrap().is_empty());
    }

    #[test]
    fn test_nested_transaction_acts_as_savepoint() {
        let mut store = create_test_store();
        let allocation = year_allocation(&mut store, 1);
        let record = store
            .insert_allocation_record(allocation.id, 1, dec("12"))
            .unwrap();

        let result = store.transaction(|tx| {
            tx.increment_used(record.id, dec("2"))?;
            let inner: EngineResult<()> = tx.transaction(|inner| {
                inner.increment_used(record.id, dec("5"))?;
                Err(EngineError::Storage {
                    message: "constraint".to_string(),
                })
            });
            assert!(inner.is_err());
            Ok(())
        });

        assert!(result.is_ok());
        assert_eq!(store.allocation_record(record.id).unwrap().unwrap().used, dec("2"));
    }

    #[test]
    fn test_employee_for_user() {
        let mut store = create_test_store();
        store.insert_employee(Employee::new(3, "Meera Iyer", "EMP-003").with_user(30));
        assert_eq!(store.employee_for_user(30).unwrap().map(|e| e.id), Some(3));
        assert!(store.employee_for_user(31).unwrap().is_none());
    }

    #[test]
    fn test_assignments_keep_insertion_order() {
        let mut store = create_test_store();
        for (shift, start) in [(2, make_date(2026, 6, 1)), (1, make_date(2026, 1, 1))] {
            store.assign_work_shift(WorkShiftAssignment {
                employee_id: 1,
                work_shift_id: shift,
                start_date: start,
                end_date: None,
            });
        }
        let ids: Vec<WorkShiftId> = store
            .work_shift_assignments(1)
            .unwrap()
            .iter()
            .map(|a| a.work_shift_id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
