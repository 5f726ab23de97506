//! Leave request models.
//!
//! This module defines the persisted [`LeaveRequest`], its lifecycle
//! [`LeaveRequestStatus`], and [`LeaveConflict`], the human-readable summary
//! of an existing request that blocks a candidate one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EmployeeId, LeaveRequestId, LeaveTypeId, UserId};

/// Lifecycle status of a leave request.
///
/// `requested` is the only non-terminal status: it can move to `approved`,
/// `rejected` or `withdrawn`, and nothing moves out of those.
///
/// # Example
///
/// ```
/// use leave_engine::models::LeaveRequestStatus;
///
/// assert!(LeaveRequestStatus::Requested.can_transition_to(LeaveRequestStatus::Approved));
/// assert!(!LeaveRequestStatus::Approved.can_transition_to(LeaveRequestStatus::Requested));
/// assert_eq!(LeaveRequestStatus::Withdrawn.label(), "Withdrawn");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveRequestStatus {
    /// Approved by an approver; counts against the balance.
    Approved,
    /// Submitted and awaiting a decision.
    #[default]
    Requested,
    /// Withdrawn by the employee.
    Withdrawn,
    /// Rejected by an approver.
    Rejected,
}

impl LeaveRequestStatus {
    /// All statuses, in display order.
    pub const ALL: [LeaveRequestStatus; 4] = [
        LeaveRequestStatus::Approved,
        LeaveRequestStatus::Requested,
        LeaveRequestStatus::Withdrawn,
        LeaveRequestStatus::Rejected,
    ];

    /// Returns the human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            LeaveRequestStatus::Approved => "Approved",
            LeaveRequestStatus::Requested => "Requested",
            LeaveRequestStatus::Withdrawn => "Withdrawn",
            LeaveRequestStatus::Rejected => "Rejected",
        }
    }

    /// Returns true for statuses that block overlapping leave.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            LeaveRequestStatus::Approved | LeaveRequestStatus::Requested
        )
    }

    /// Returns true if a request in this status may move to `next`.
    pub fn can_transition_to(&self, next: LeaveRequestStatus) -> bool {
        matches!(
            (self, next),
            (
                LeaveRequestStatus::Requested,
                LeaveRequestStatus::Approved
                    | LeaveRequestStatus::Rejected
                    | LeaveRequestStatus::Withdrawn
            )
        )
    }
}

impl std::fmt::Display for LeaveRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which half of the day a half-day request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HalfDayShift {
    /// Not a half-day request.
    #[default]
    #[serde(rename = "na")]
    NotApplicable,
    /// The afternoon half.
    #[serde(rename = "an")]
    Afternoon,
    /// The forenoon half.
    #[serde(rename = "fn")]
    Forenoon,
}

impl HalfDayShift {
    /// Returns the human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            HalfDayShift::NotApplicable => "Not Applicable",
            HalfDayShift::Afternoon => "Afternoon",
            HalfDayShift::Forenoon => "Forenoon",
        }
    }
}

impl std::fmt::Display for HalfDayShift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A persisted leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier for the request.
    pub id: LeaveRequestId,
    /// The employee taking leave.
    pub employee_id: EmployeeId,
    /// The requested leave type.
    pub leave_type_id: LeaveTypeId,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Whether this is a half-day request.
    #[serde(default, alias = "is_half_date")]
    pub is_half_day: bool,
    /// Which half of the day, for half-day requests.
    #[serde(default)]
    pub half_day_shift: HalfDayShift,
    /// Reason given by the employee.
    #[serde(default)]
    pub reason: Option<String>,
    /// Who covers while the employee is away.
    #[serde(default)]
    pub alternate_arrangement: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: LeaveRequestStatus,
    /// The user who filed the request.
    #[serde(default)]
    pub requester_user_id: Option<UserId>,
    /// The user expected to decide on the request.
    #[serde(default)]
    pub approver_user_id: Option<UserId>,
    /// Comment left with the decision.
    #[serde(default)]
    pub approver_comment: Option<String>,
}

impl LeaveRequest {
    /// Returns true if the request's range shares a day with `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    /// Returns true if `date` falls within the request's range.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Returns true while the request can still be edited or removed.
    pub fn is_editable(&self) -> bool {
        self.status == LeaveRequestStatus::Requested
    }
}

/// Field values for a leave request that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeaveRequest {
    /// The employee taking leave.
    pub employee_id: EmployeeId,
    /// The requested leave type.
    pub leave_type_id: LeaveTypeId,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Whether this is a half-day request.
    #[serde(default)]
    pub is_half_day: bool,
    /// Which half of the day, for half-day requests.
    #[serde(default)]
    pub half_day_shift: HalfDayShift,
    /// Reason given by the employee.
    #[serde(default)]
    pub reason: Option<String>,
    /// Who covers while the employee is away.
    #[serde(default)]
    pub alternate_arrangement: Option<String>,
    /// Initial status.
    #[serde(default)]
    pub status: LeaveRequestStatus,
    /// The user who filed the request.
    #[serde(default)]
    pub requester_user_id: Option<UserId>,
    /// The user expected to decide on the request.
    #[serde(default)]
    pub approver_user_id: Option<UserId>,
}

impl NewLeaveRequest {
    /// Creates a full-day `requested` request with no free-text fields.
    pub fn new(
        employee_id: EmployeeId,
        leave_type_id: LeaveTypeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            employee_id,
            leave_type_id,
            start_date,
            end_date,
            is_half_day: false,
            half_day_shift: HalfDayShift::NotApplicable,
            reason: None,
            alternate_arrangement: None,
            status: LeaveRequestStatus::Requested,
            requester_user_id: None,
            approver_user_id: None,
        }
    }

    /// Sets the initial status.
    pub fn with_status(mut self, status: LeaveRequestStatus) -> Self {
        self.status = status;
        self
    }

    /// Marks the request as a half day on the given half.
    pub fn half_day(mut self, shift: HalfDayShift) -> Self {
        self.is_half_day = true;
        self.half_day_shift = shift;
        self
    }

    /// Attaches the stored identifier.
    pub fn into_request(self, id: LeaveRequestId) -> LeaveRequest {
        LeaveRequest {
            id,
            employee_id: self.employee_id,
            leave_type_id: self.leave_type_id,
            start_date: self.start_date,
            end_date: self.end_date,
            is_half_day: self.is_half_day,
            half_day_shift: self.half_day_shift,
            reason: self.reason,
            alternate_arrangement: self.alternate_arrangement,
            status: self.status,
            requester_user_id: self.requester_user_id,
            approver_user_id: self.approver_user_id,
            approver_comment: None,
        }
    }
}

/// An existing request that conflicts with a candidate one.
///
/// Displays as `"{leave type} ({start} to {end}) - {status label}"`.
///
/// # Example
///
/// ```
/// use leave_engine::models::{LeaveConflict, LeaveRequestStatus};
/// use chrono::NaiveDate;
///
/// let conflict = LeaveConflict {
///     leave_request_id: 3,
///     leave_type_name: "Casual Leave".to_string(),
///     start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
///     status: LeaveRequestStatus::Requested,
/// };
/// assert_eq!(conflict.to_string(), "Casual Leave (2026-03-02 to 2026-03-03) - Requested");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveConflict {
    /// The conflicting request.
    pub leave_request_id: LeaveRequestId,
    /// Name of its leave type.
    pub leave_type_name: String,
    /// Its first day.
    pub start_date: NaiveDate,
    /// Its last day.
    pub end_date: NaiveDate,
    /// Its status.
    pub status: LeaveRequestStatus,
}

impl std::fmt::Display for LeaveConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} to {}) - {}",
            self.leave_type_name,
            self.start_date.format("%Y-%m-%d"),
            self.end_date.format("%Y-%m-%d"),
            self.status.label()
        )
    }
}
