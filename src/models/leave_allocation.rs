//! Leave allocation models.
//!
//! A [`LeaveAllocation`] is a grant period for one employee. It owns one
//! [`LeaveAllocationRecord`] per leave type, holding the allotted and used
//! day counts for that type within the period.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AllocationRecordId, EmployeeId, LeaveAllocationId, LeaveTypeId};

/// A grant period `[start_date, end_date]` for one employee.
///
/// # Example
///
/// ```
/// use leave_engine::models::LeaveAllocation;
/// use chrono::NaiveDate;
///
/// let allocation = LeaveAllocation {
///     id: 1,
///     employee_id: 1,
///     start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
///     description: None,
/// };
///
/// let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let end = NaiveDate::from_ymd_opt(2026, 3, 6).unwrap();
/// assert!(allocation.contains_range(start, end));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveAllocation {
    /// Unique identifier for the allocation.
    pub id: LeaveAllocationId,
    /// The employee the period belongs to.
    pub employee_id: EmployeeId,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Free-text note.
    #[serde(default)]
    pub description: Option<String>,
}

impl LeaveAllocation {
    /// Returns true if `[start, end]` lies fully within the period.
    pub fn contains_range(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= start && self.end_date >= end
    }

    /// Returns true if the period shares at least one day with `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }
}

/// Allotted and used day counts for one leave type within an allocation.
///
/// `used` is never negative. `remaining` may be negative when the record is
/// over-allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveAllocationRecord {
    /// Unique identifier for the record.
    pub id: AllocationRecordId,
    /// The owning allocation.
    pub leave_allocation_id: LeaveAllocationId,
    /// The leave type this record tracks.
    pub leave_type_id: LeaveTypeId,
    /// Days granted.
    pub allotted: Decimal,
    /// Days consumed by approved requests.
    #[serde(default)]
    pub used: Decimal,
}

impl LeaveAllocationRecord {
    /// Returns `allotted - used`.
    pub fn remaining(&self) -> Decimal {
        self.allotted - self.used
    }

    /// Returns true if any balance remains.
    pub fn has_remaining(&self) -> bool {
        self.remaining() > Decimal::ZERO
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

    fn create_test_allocation() -> LeaveAllocation {
        LeaveAllocation {
            id: 1,
            employee_id: 1,
            start_date: make_date(2026, 1, 1),
            end_date: make_date(2026, 12, 31),
            description: Some("Calendar year 2026".to_string()),
        }
    }

    #[test]
    fn test_contains_range_requires_full_containment() {
        let allocation = create_test_allocation();
        assert!(allocation.contains_range(make_date(2026, 1, 1), make_date(2026, 12, 31)));
        assert!(!allocation.contains_range(make_date(2025, 12, 31), make_date(2026, 1, 2)));
        assert!(!allocation.contains_range(make_date(2026, 12, 30), make_date(2027, 1, 2)));
    }

    #[test]
    fn test_overlaps_on_shared_boundary_day() {
        let allocation = create_test_allocation();
        assert!(allocation.overlaps(make_date(2026, 12, 31), make_date(2027, 12, 31)));
        assert!(!allocation.overlaps(make_date(2027, 1, 1), make_date(2027, 12, 31)));
    }

    #[test]
    fn test_remaining_may_be_negative() {
        let record = LeaveAllocationRecord {
            id: 1,
            leave_allocation_id: 1,
            leave_type_id: 1,
            allotted: dec("2"),
            used: dec("3.5"),
        };
        assert_eq!(record.remaining(), dec("-1.5"));
        assert!(!record.has_remaining());
    }

    #[test]
    fn test_decimal_counts_serialize_as_strings() {
        let record = LeaveAllocationRecord {
            id: 1,
            leave_allocation_id: 1,
            leave_type_id: 2,
            allotted: dec("12"),
            used: dec("0.5"),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["used"], "0.5");
    }
}
