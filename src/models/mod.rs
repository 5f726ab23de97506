//! Core data models for the leave engine.
//!
//! This module contains the calendar-oriented domain model the services
//! operate over: employees, work shifts, holidays, leave types, leave
//! allocations and leave requests.

mod adjustment;
mod designation;
mod employee;
mod holiday;
mod leave_allocation;
mod leave_request;
mod leave_type;
mod work_shift;

/// Identifier of an [`Employee`].
pub type EmployeeId = u64;
/// Identifier of a [`LeaveType`].
pub type LeaveTypeId = u64;
/// Identifier of a [`LeaveRequest`].
pub type LeaveRequestId = u64;
/// Identifier of a [`LeaveAllocation`].
pub type LeaveAllocationId = u64;
/// Identifier of a [`LeaveAllocationRecord`].
pub type AllocationRecordId = u64;
/// Identifier of a [`WorkShift`].
pub type WorkShiftId = u64;
/// Identifier of a [`Holiday`].
pub type HolidayId = u64;
/// Identifier of an application user.
pub type UserId = u64;
/// Identifier of a designation in the organisation chart.
pub type DesignationId = u64;

pub use adjustment::{AdjustmentKind, CountAdjustment, RecordRecount};
pub use designation::Designation;
pub use employee::Employee;
pub use holiday::{Holiday, HolidayType};
pub use leave_allocation::{LeaveAllocation, LeaveAllocationRecord};
pub use leave_request::{
    HalfDayShift, LeaveConflict, LeaveRequest, LeaveRequestStatus, NewLeaveRequest,
};
pub use leave_type::LeaveType;
pub use work_shift::{WorkShift, WorkShiftAssignment, parse_weekday, weekday_name};
