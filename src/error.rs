//! Error types for the leave engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the validation pipeline, the counter maintenance and the
//! configuration loader can report. Validation failures are field-scoped: see
//! [`EngineError::field_errors`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{LeaveConflict, LeaveRequestId, LeaveRequestStatus};

/// A form field a validation failure can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveField {
    /// The employee the leave is requested for.
    EmployeeId,
    /// The requested leave type.
    LeaveTypeId,
    /// First day of leave.
    StartDate,
    /// Last day of leave.
    EndDate,
    /// The half-day flag.
    IsHalfDate,
    /// The request status.
    Status,
    /// The approver comment.
    ApproverComment,
}

impl LeaveField {
    /// Returns the wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveField::EmployeeId => "employee_id",
            LeaveField::LeaveTypeId => "leave_type_id",
            LeaveField::StartDate => "start_date",
            LeaveField::EndDate => "end_date",
            LeaveField::IsHalfDate => "is_half_date",
            LeaveField::Status => "status",
            LeaveField::ApproverComment => "approver_comment",
        }
    }
}

impl std::fmt::Display for LeaveField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message attached to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The field to highlight.
    pub field: LeaveField,
    /// Human-readable message for that field.
    pub message: String,
}

impl FieldError {
    fn new(field: LeaveField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// The kind of record a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// An employee.
    Employee,
    /// A leave type.
    LeaveType,
    /// A leave request.
    LeaveRequest,
    /// A leave allocation period.
    LeaveAllocation,
    /// A per-leave-type allocation record.
    LeaveAllocationRecord,
    /// A work shift.
    WorkShift,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Employee => write!(f, "Employee"),
            EntityKind::LeaveType => write!(f, "Leave type"),
            EntityKind::LeaveRequest => write!(f, "Leave request"),
            EntityKind::LeaveAllocation => write!(f, "Leave allocation"),
            EntityKind::LeaveAllocationRecord => write!(f, "Leave allocation record"),
            EntityKind::WorkShift => write!(f, "Work shift"),
        }
    }
}

/// Which neighbour of a leave request a consecutive-leave check looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjacency {
    /// The working day after the request's end date.
    Next,
    /// The working day before the request's start date.
    Previous,
}

impl std::fmt::Display for Adjacency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Adjacency::Next => write!(f, "next"),
            Adjacency::Previous => write!(f, "previous"),
        }
    }
}

fn join_conflicts(conflicts: &[LeaveConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_fields(fields: &[LeaveField]) -> String {
    fields
        .iter()
        .map(LeaveField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The main error type for the leave engine.
///
/// # Example
///
/// ```
/// use leave_engine::error::EngineError;
/// use rust_decimal::Decimal;
///
/// let error = EngineError::InsufficientBalance {
///     required: Decimal::from(8),
///     available: Decimal::from(7),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Insufficient leave balance. Required: 8 days, Available: 7 days."
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// One or more required submission fields were absent.
    #[error("Missing required field(s): {}", join_fields(.fields))]
    MissingRequiredField {
        /// The absent fields.
        fields: Vec<LeaveField>,
    },

    /// The end date precedes the start date.
    #[error("End date must be greater than or equal to start date.")]
    InvalidDateOrder {
        /// The submitted start date.
        start_date: NaiveDate,
        /// The submitted end date.
        end_date: NaiveDate,
    },

    /// A half-day request spans more than one date.
    #[error("For half day leave, start date and end date must be the same.")]
    InvalidHalfDayConfig {
        /// The submitted start date.
        start_date: NaiveDate,
        /// The submitted end date.
        end_date: NaiveDate,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record.
        entity: EntityKind,
        /// The id that failed to resolve.
        id: u64,
    },

    /// The employee has no work shift assignment applicable to the request.
    #[error("No work shift found for this employee for the requested dates.")]
    NoWorkShift {
        /// The employee.
        employee_id: u64,
        /// The request start date the assignment had to cover.
        date: NaiveDate,
    },

    /// The candidate range overlaps existing requested/approved leave.
    #[error("Leave request overlaps with existing leave(s): {}", join_conflicts(.conflicts))]
    Overlap {
        /// The conflicting requests.
        conflicts: Vec<LeaveConflict>,
    },

    /// The adjacent working day carries leave of a different type.
    #[error(
        "The {direction} working day ({adjacent_day}) has a different leave type applied: {}. Consecutive leave periods must use the same leave type.",
        join_conflicts(.conflicts)
    )]
    ConsecutiveLeaveTypeConflict {
        /// Which neighbour was checked.
        direction: Adjacency,
        /// The adjacent working day.
        adjacent_day: NaiveDate,
        /// Name of the leave type the candidate asked for.
        requested_type: String,
        /// The requests covering the adjacent working day.
        conflicts: Vec<LeaveConflict>,
    },

    /// Required days exceed the remaining balance.
    #[error(
        "Insufficient leave balance. Required: {} days, Available: {} days.",
        .required.normalize(),
        .available.normalize()
    )]
    InsufficientBalance {
        /// Days the request needs.
        required: Decimal,
        /// Days remaining in the covering allocation.
        available: Decimal,
    },

    /// A leave allocation overlaps another allocation of the same employee.
    #[error("This employee already has a leave allocation that overlaps with the selected period.")]
    AllocationOverlap {
        /// The employee.
        employee_id: u64,
        /// Start of the rejected period.
        start_date: NaiveDate,
        /// End of the rejected period.
        end_date: NaiveDate,
    },

    /// A status change not allowed by the request lifecycle.
    #[error("Cannot change leave request status from {from} to {to}.")]
    InvalidStatusTransition {
        /// Current status.
        from: LeaveRequestStatus,
        /// Requested status.
        to: LeaveRequestStatus,
    },

    /// The request can no longer be edited or removed.
    #[error("Leave request {request_id} is {status} and can no longer be changed.")]
    NotEditable {
        /// The request.
        request_id: LeaveRequestId,
        /// Its current status.
        status: LeaveRequestStatus,
    },

    /// The acting user may not perform the action.
    #[error("Permission denied: {action}")]
    PermissionDenied {
        /// Description of the refused action.
        action: String,
    },

    /// A required free-text field was empty.
    #[error("{field} is required.")]
    EmptyField {
        /// The empty field.
        field: LeaveField,
    },

    /// A submission payload could not be decoded.
    #[error("Invalid leave request submission: {message}")]
    InvalidSubmission {
        /// A description of the decode error.
        message: String,
    },

    /// A date value could not be parsed.
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but is inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },

    /// The persistence layer failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Returns a stable code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            EngineError::InvalidDateOrder { .. } => "INVALID_DATE_ORDER",
            EngineError::InvalidHalfDayConfig { .. } => "INVALID_HALF_DAY_CONFIG",
            EngineError::NotFound { .. } => "NOT_FOUND",
            EngineError::NoWorkShift { .. } => "NO_WORK_SHIFT",
            EngineError::Overlap { .. } => "OVERLAP_ERROR",
            EngineError::ConsecutiveLeaveTypeConflict { .. } => "CONSECUTIVE_LEAVE_TYPE_CONFLICT",
            EngineError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            EngineError::AllocationOverlap { .. } => "ALLOCATION_OVERLAP",
            EngineError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            EngineError::NotEditable { .. } => "NOT_EDITABLE",
            EngineError::PermissionDenied { .. } => "PERMISSION_DENIED",
            EngineError::EmptyField { .. } => "EMPTY_FIELD",
            EngineError::InvalidSubmission { .. } => "INVALID_SUBMISSION",
            EngineError::InvalidDate { .. } => "INVALID_DATE",
            EngineError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            EngineError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            EngineError::InvalidConfig { .. } => "INVALID_CONFIG",
            EngineError::Storage { .. } => "STORAGE_ERROR",
        }
    }

    /// Returns the per-field messages a form layer should display.
    ///
    /// Errors that are not attributable to a submission field (configuration,
    /// storage, permission) return an empty list.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            EngineError::MissingRequiredField { fields } => fields
                .iter()
                .map(|field| {
                    let message = match field {
                        LeaveField::EmployeeId => "Employee ID is required for validation.",
                        LeaveField::LeaveTypeId => "Leave type is required.",
                        LeaveField::StartDate | LeaveField::EndDate => {
                            "Start date and end date are required."
                        }
                        LeaveField::IsHalfDate => "Half day flag is required.",
                        LeaveField::Status => "Status is required.",
                        LeaveField::ApproverComment => "Approver comment is required.",
                    };
                    FieldError::new(*field, message)
                })
                .collect(),
            EngineError::InvalidDateOrder { .. } => {
                vec![FieldError::new(LeaveField::EndDate, self.to_string())]
            }
            EngineError::InvalidHalfDayConfig { .. } => vec![
                FieldError::new(LeaveField::IsHalfDate, self.to_string()),
                FieldError::new(LeaveField::EndDate, self.to_string()),
            ],
            EngineError::NotFound { entity, .. } => match entity {
                EntityKind::Employee => {
                    vec![FieldError::new(LeaveField::EmployeeId, "Employee not found.")]
                }
                EntityKind::LeaveType => {
                    vec![FieldError::new(LeaveField::LeaveTypeId, "Leave type not found.")]
                }
                _ => Vec::new(),
            },
            EngineError::NoWorkShift { .. } => {
                vec![FieldError::new(LeaveField::EmployeeId, self.to_string())]
            }
            EngineError::Overlap { .. } | EngineError::AllocationOverlap { .. } => vec![
                FieldError::new(LeaveField::StartDate, self.to_string()),
                FieldError::new(LeaveField::EndDate, self.to_string()),
            ],
            EngineError::ConsecutiveLeaveTypeConflict {
                direction,
                requested_type,
                ..
            } => {
                let date_field = match direction {
                    Adjacency::Next => LeaveField::EndDate,
                    Adjacency::Previous => LeaveField::StartDate,
                };
                vec![
                    FieldError::new(date_field, self.to_string()),
                    FieldError::new(
                        LeaveField::LeaveTypeId,
                        format!(
                            "Cannot apply {} as the {} working day has a different leave type applied.",
                            requested_type, direction
                        ),
                    ),
                ]
            }
            EngineError::InsufficientBalance { .. } => {
                vec![FieldError::new(LeaveField::LeaveTypeId, self.to_string())]
            }
            EngineError::InvalidStatusTransition { .. } | EngineError::NotEditable { .. } => {
                vec![FieldError::new(LeaveField::Status, self.to_string())]
            }
            EngineError::EmptyField { field } => {
                vec![FieldError::new(*field, self.to_string())]
            }
            EngineError::PermissionDenied { .. }
            | EngineError::InvalidSubmission { .. }
            | EngineError::InvalidDate { .. }
            | EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. }
            | EngineError::Storage { .. } => Vec::new(),
        }
    }

    /// Returns true for failures raised by the validation pipeline itself,
    /// as opposed to configuration or storage faults.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            EngineError::ConfigNotFound { .. }
                | EngineError::ConfigParseError { .. }
                | EngineError::InvalidConfig { .. }
                | EngineError::Storage { .. }
        )
    }
}
