//! Leave sizing and balance lookup.
//!
//! This module provides [`LeaveBalanceService`], which answers two questions
//! for a candidate request: how many days it costs, and how many days remain
//! in the allocation period that covers it.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::EngineSettings;
use crate::error::EngineResult;
use crate::models::{
    EmployeeId, LeaveAllocation, LeaveAllocationRecord, LeaveType, LeaveTypeId, WorkShift,
};
use crate::store::LeaveStore;

use super::WorkingDayService;

/// Computes required leave days and remaining balances.
#[derive(Debug)]
pub struct LeaveBalanceService<'a, S> {
    store: &'a S,
    working_days: WorkingDayService<'a, S>,
    settings: EngineSettings,
}

impl<S> Clone for LeaveBalanceService<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for LeaveBalanceService<'_, S> {}

impl<'a, S: LeaveStore> LeaveBalanceService<'a, S> {
    /// Creates a service reading from `store`.
    pub fn new(store: &'a S, settings: EngineSettings) -> Self {
        Self {
            store,
            working_days: WorkingDayService::new(store, settings),
            settings,
        }
    }

    /// Calculates the days a request costs.
    ///
    /// # Arguments
    ///
    /// * `start` - First day of leave
    /// * `end` - Last day of leave
    /// * `shift` - The employee's work shift
    /// * `leave_type` - The requested leave type
    /// * `is_half_day` - Whether the request is for half a day
    ///
    /// # Returns
    ///
    /// - the configured half-day value for a half-day request
    /// - every calendar day in `[start, end]` for a sandwich leave type
    /// - otherwise the number of working days in `[start, end]`
    ///
    /// # Example
    ///
    /// ```
    /// use leave_engine::config::EngineSettings;
    /// use leave_engine::models::{LeaveType, WorkShift};
    /// use leave_engine::services::LeaveBalanceService;
    /// use leave_engine::store::MemoryStore;
    /// use chrono::{NaiveDate, NaiveTime};
    /// use rust_decimal::Decimal;
    ///
    /// let store = MemoryStore::new();
    /// let balance = LeaveBalanceService::new(&store, EngineSettings::default());
    /// let shift = WorkShift {
    ///     id: 1,
    ///     name: "General".to_string(),
    ///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
    ///     weekoffs: vec!["saturday".to_string(), "sunday".to_string()],
    /// };
    /// let mut earned = LeaveType {
    ///     id: 3,
    ///     name: "Earned Leave".to_string(),
    ///     code: "earned".to_string(),
    ///     yearly_grant: Decimal::from(15),
    ///     is_sandwich_type: true,
    /// };
    ///
    /// // Friday to Monday
    /// let start = NaiveDate::from_ymd_opt(2026, 3, 6).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
    ///
    /// let days = balance.calculate_required_leave_days(start, end, &shift, &earned, false).unwrap();
    /// assert_eq!(days, Decimal::from(4));
    ///
    /// earned.is_sandwich_type = false;
    /// let days = balance.calculate_required_leave_days(start, end, &shift, &earned, false).unwrap();
    /// assert_eq!(days, Decimal::from(2));
    /// ```
    pub fn calculate_required_leave_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        shift: &WorkShift,
        leave_type: &LeaveType,
        is_half_day: bool,
    ) -> EngineResult<Decimal> {
        if is_half_day {
            return Ok(self.settings.half_day_value);
        }

        if leave_type.is_sandwich_type {
            return Ok(Decimal::from(calendar_days(start, end)));
        }

        let working = self.working_days.count_working_days_between(start, end, shift)?;
        Ok(Decimal::from(working))
    }

    /// Returns the remaining balance of `leave_type_id` in the allocation
    /// that fully contains `[start, end]`.
    ///
    /// Zero when no allocation covers the range or the allocation has no
    /// record for the leave type. May be negative for an over-allocated
    /// record.
    pub fn available_leave_balance(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Decimal> {
        Ok(self
            .allocation_record_for(employee_id, leave_type_id, start, end)?
            .map(|record| record.remaining())
            .unwrap_or(Decimal::ZERO))
    }

    /// Returns the employee's allocation whose period fully contains
    /// `[start, end]`.
    pub fn covering_allocation(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Option<LeaveAllocation>> {
        Ok(self
            .store
            .leave_allocations_for(employee_id)?
            .into_iter()
            .find(|a| a.contains_range(start, end)))
    }

    /// Returns the record tracking `leave_type_id` in the covering allocation.
    pub fn allocation_record_for(
        &self,
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Option<LeaveAllocationRecord>> {
        let Some(allocation) = self.covering_allocation(employee_id, start, end)? else {
            return Ok(None);
        };

        Ok(self
            .store
            .allocation_records(allocation.id)?
            .into_iter()
            .find(|r| r.leave_type_id == leave_type_id))
    }
}

/// Calendar days in `[start, end]`, zero for an inverted range.
pub(crate) fn calendar_days(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Holiday, HolidayType};
    use crate::store::MemoryStore;
    use chrono::NaiveTime;
    use std::str::FromStr;

    fn make_date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_shift() -> WorkShift {
        WorkShift {
            id: 1,
            name: "General".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            weekoffs: vec!["saturday".to_string(), "sunday".to_string()],
        }
    }

    fn create_test_leave_type(is_sandwich_type: bool) -> LeaveType {
        LeaveType {
            id: 1,
            name: "Casual Leave".to_string(),
            code: "casual".to_string(),
            yearly_grant: dec("12"),
            is_sandwich_type,
        }
    }

    fn create_test_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_employee(Employee::new(1, "Asha Rao", "EMP-001"));
        store
    }

    // ==========================================================================
    // Required days
    // ==========================================================================

    #[test]
    fn test_monday_to_friday_costs_five_days() {
        let store = create_test_store();
        let service = LeaveBalanceService::new(&store, EngineSettings::default());

        let days = service
            .calculate_required_leave_days(
                make_date(2026, 3, 2),
                make_date(2026, 3, 6),
                &create_test_shift(),
                &create_test_leave_type(false),
                false,
            )
            .unwrap();
        assert_eq!(days, dec("5"));
    }

    #[test]
    fn test_half_day_costs_half_regardless_of_type() {
        let store = create_test_store();
        let service = LeaveBalanceService::new(&store, EngineSettings::default());

        for sandwich in [false, true] {
            let days = service
                .calculate_required_leave_days(
                    make_date(2026, 3, 7),
                    make_date(2026, 3, 7),
                    &create_test_shift(),
                    &create_test_leave_type(sandwich),
                    true,
                )
                .unwrap();
            assert_eq!(days, dec("0.5"));
        }
    }

    #[test]
    fn test_sandwich_counts_holidays_inside_range() {
        let mut store = create_test_store();
        store.insert_holiday(Holiday {
            id: 1,
            name: "Holi".to_string(),
            from_date: make_date(2026, 3, 4),
            to_date: make_date(2026, 3, 4),
            holiday_type: HolidayType::Global,
        });
        let service = LeaveBalanceService::new(&store, EngineSettings::default());
        let start = make_date(2026, 3, 2);
        let end = make_date(2026, 3, 6);

        let sandwich = service
            .calculate_required_leave_days(start, end, &create_test_shift(), &create_test_leave_type(true), false)
            .unwrap();
        let regular = service
            .calculate_required_leave_days(start, end, &create_test_shift(), &create_test_leave_type(false), false)
            .unwrap();
        assert_eq!(sandwich, dec("5"));
        assert_eq!(regular, dec("4"));
    }

    #[test]
    fn test_weekend_only_request_costs_nothing() {
        let store = create_test_store();
        let service = LeaveBalanceService::new(&store, EngineSettings::default());

        let days = service
            .calculate_required_leave_days(
                make_date(2026, 3, 7),
                make_date(2026, 3, 8),
                &create_test_shift(),
                &create_test_leave_type(false),
                false,
            )
            .unwrap();
        assert_eq!(days, Decimal::ZERO);
    }

    #[test]
    fn test_calendar_days_for_inverted_range_is_zero() {
        assert_eq!(calendar_days(make_date(2026, 3, 9), make_date(2026, 3, 6)), 0);
        assert_eq!(calendar_days(make_date(2026, 3, 6), make_date(2026, 3, 6)), 1);
    }

    // ==========================================================================
    // Balance
    // ==========================================================================

    #[test]
    fn test_available_balance_is_remaining_of_covering_record() {
        let mut store = create_test_store();
        let allocation = store
            .insert_leave_allocation(1, make_date(2026, 1, 1), make_date(2026, 12, 31), None)
            .unwrap();
        let record = store
            .insert_allocation_record(allocation.id, 1, dec("10"))
            .unwrap();
        store.increment_used(record.id, dec("3")).unwrap();
        let service = LeaveBalanceService::new(&store, EngineSettings::default());

        let available = service
            .available_leave_balance(1, 1, make_date(2026, 3, 2), make_date(2026, 3, 6))
            .unwrap();
        assert_eq!(available, dec("7"));
    }

    #[test]
    fn test_range_crossing_allocation_boundary_has_no_balance() {
        let mut store = create_test_store();
        let allocation = store
            .insert_leave_allocation(1, make_date(2026, 1, 1), make_date(2026, 12, 31), None)
            .unwrap();
        store
            .insert_allocation_record(allocation.id, 1, dec("10"))
            .unwrap();
        let service = LeaveBalanceService::new(&store, EngineSettings::default());

        let available = service
            .available_leave_balance(1, 1, make_date(2026, 12, 30), make_date(2027, 1, 2))
            .unwrap();
        assert_eq!(available, Decimal::ZERO);
    }

    #[test]
    fn test_missing_record_for_leave_type_has_no_balance() {
        let mut store = create_test_store();
        let allocation = store
            .insert_leave_allocation(1, make_date(2026, 1, 1), make_date(2026, 12, 31), None)
            .unwrap();
        store
            .insert_allocation_record(allocation.id, 1, dec("10"))
            .unwrap();
        let service = LeaveBalanceService::new(&store, EngineSettings::default());

        let available = service
            .available_leave_balance(1, 2, make_date(2026, 3, 2), make_date(2026, 3, 6))
            .unwrap();
        assert_eq!(available, Decimal::ZERO);
    }
}
