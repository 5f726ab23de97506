//! Inbound leave request submissions.
//!
//! A form layer hands the engine a loosely-typed data bag. This module
//! accepts it as [`LeaveRequestSubmission`], deserializable from JSON with
//! every field optional, and normalizes it into [`LeaveRequestData`] for the
//! validation pipeline.
//!
//! Accepted encodings:
//!
//! - ids as numbers or numeric strings; `0` and `""` count as absent
//! - dates as `YYYY-MM-DD`, an ISO-8601 date-time, or `YYYY-MM-DD HH:MM:SS`
//!   (only the date part is kept)
//! - the half-day flag as `true`/`false`, `1`/`0` or `"1"`/`"0"`, under
//!   either the `is_half_date` or the `is_half_day` key

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{EngineError, EngineResult, LeaveField};
use crate::models::{
    EmployeeId, HalfDayShift, LeaveRequest, LeaveRequestId, LeaveTypeId,
};

/// Parses a date in any of the accepted encodings.
///
/// # Example
///
/// ```
/// use leave_engine::submission::parse_date;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2026, 6, 8).unwrap();
/// assert_eq!(parse_date("2026-06-08").unwrap(), expected);
/// assert_eq!(parse_date("2026-06-08T09:30:00+05:30").unwrap(), expected);
/// assert_eq!(parse_date("2026-06-08 09:30:00").unwrap(), expected);
/// assert!(parse_date("08/06/2026").is_err());
/// ```
pub fn parse_date(value: &str) -> EngineResult<NaiveDate> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(datetime.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }

    Err(EngineError::InvalidDate {
        value: value.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(0)) => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            let id: u64 = text
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid id '{}'", text)))?;
            Ok((id != 0).then_some(id))
        }
    }
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => parse_date(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        None => false,
        Some(RawFlag::Bool(flag)) => flag,
        Some(RawFlag::Int(value)) => value == 1,
        Some(RawFlag::Text(text)) => {
            let text = text.trim();
            text == "1" || text.eq_ignore_ascii_case("true")
        }
    })
}

/// A leave request as submitted by a form, before validation.
///
/// # Example
///
/// ```
/// use leave_engine::submission::LeaveRequestSubmission;
///
/// let submission = LeaveRequestSubmission::from_json(
///     r#"{"leave_type_id": "2", "start_date": "2026-06-08", "end_date": "2026-06-08", "is_half_date": "1"}"#,
/// )
/// .unwrap();
///
/// assert_eq!(submission.employee_id, None);
/// assert_eq!(submission.leave_type_id, Some(2));
/// assert!(submission.is_half_date);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequestSubmission {
    /// The employee, when the form lets the actor choose one.
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub employee_id: Option<EmployeeId>,
    /// The requested leave type.
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub leave_type_id: Option<LeaveTypeId>,
    /// First day of leave.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    /// Last day of leave.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
    /// Whether this is a half-day request.
    #[serde(default, alias = "is_half_day", deserialize_with = "deserialize_flag")]
    pub is_half_date: bool,
    /// Which half of the day, for half-day requests.
    #[serde(default)]
    pub half_day_shift: HalfDayShift,
    /// Reason given by the employee.
    #[serde(default)]
    pub reason: Option<String>,
    /// Who covers while the employee is away.
    #[serde(default)]
    pub alternate_arrangement: Option<String>,
}

impl LeaveRequestSubmission {
    /// Creates a full-day submission for the given type and range.
    pub fn new(leave_type_id: LeaveTypeId, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            leave_type_id: Some(leave_type_id),
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    /// Decodes a JSON form payload.
    ///
    /// Returns `InvalidSubmission` when the payload is not a JSON object or
    /// a field has the wrong shape.
    pub fn from_json(payload: &str) -> EngineResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| EngineError::InvalidSubmission {
                message: e.to_string(),
            })?;

        // Derived struct decoding also fills fields from a positional array.
        if !value.is_object() {
            return Err(EngineError::InvalidSubmission {
                message: "expected a JSON object".to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| EngineError::InvalidSubmission {
            message: e.to_string(),
        })
    }

    /// Sets the employee explicitly.
    pub fn for_employee(mut self, employee_id: EmployeeId) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    /// Marks the submission as a half day on the given half.
    pub fn half_day(mut self, shift: HalfDayShift) -> Self {
        self.is_half_date = true;
        self.half_day_shift = shift;
        self
    }

    /// Sets the reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Rebuilds the submission a stored request was created from.
    pub fn from_request(request: &LeaveRequest) -> Self {
        Self {
            employee_id: Some(request.employee_id),
            leave_type_id: Some(request.leave_type_id),
            start_date: Some(request.start_date),
            end_date: Some(request.end_date),
            is_half_date: request.is_half_day,
            half_day_shift: request.half_day_shift,
            reason: request.reason.clone(),
            alternate_arrangement: request.alternate_arrangement.clone(),
        }
    }
}

/// The normalized fields the validation pipeline works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveRequestData {
    /// The employee, from the submission or the acting user.
    pub employee_id: Option<EmployeeId>,
    /// The requested leave type.
    pub leave_type_id: Option<LeaveTypeId>,
    /// First day of leave.
    pub start_date: Option<NaiveDate>,
    /// Last day of leave.
    pub end_date: Option<NaiveDate>,
    /// Whether this is a half-day request.
    pub is_half_day: bool,
    /// The request being edited, which must not conflict with itself.
    pub exclude_request_id: Option<LeaveRequestId>,
}

impl LeaveRequestData {
    /// Normalizes a submission.
    ///
    /// When the submission names no employee, `fallback_employee` (the acting
    /// user's own employee record) is used. Zero ids count as absent.
    pub fn from_submission(
        submission: &LeaveRequestSubmission,
        exclude_request_id: Option<LeaveRequestId>,
        fallback_employee: Option<EmployeeId>,
    ) -> Self {
        let non_zero = |id: Option<u64>| id.filter(|id| *id != 0);
        Self {
            employee_id: non_zero(submission.employee_id).or(non_zero(fallback_employee)),
            leave_type_id: non_zero(submission.leave_type_id),
            start_date: submission.start_date,
            end_date: submission.end_date,
            is_half_day: submission.is_half_date,
            exclude_request_id: non_zero(exclude_request_id),
        }
    }

    /// Returns the required fields that are absent, in form order.
    pub fn missing_fields(&self) -> Vec<LeaveField> {
        let mut missing = Vec::new();
        if self.employee_id.is_none() {
            missing.push(LeaveField::EmployeeId);
        }
        if self.leave_type_id.is_none() {
            missing.push(LeaveField::LeaveTypeId);
        }
        if self.start_date.is_none() {
            missing.push(LeaveField::StartDate);
        }
        if self.end_date.is_none() {
            missing.push(LeaveField::EndDate);
        }
        missing
    }

    /// Returns true if every required field is present.
    pub fn has_required_fields(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Returns true if both dates are present and in order.
    pub fn has_valid_dates(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(s), Some(e)) if s <= e)
    }

    /// Returns false only for a half-day request whose dates differ.
    pub fn has_valid_half_day_config(&self) -> bool {
        match (self.is_half_day, self.start_date, self.end_date) {
            (true, Some(s), Some(e)) => s == e,
            _ => true,
        }
    }
}
