//! Work shift models.
//!
//! A [`WorkShift`] fixes the daily hours and the weekoff weekdays of the
//! employees assigned to it. Assignments are time-bounded through
//! [`WorkShiftAssignment`].

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::{EmployeeId, WorkShiftId};

/// Returns the lowercase English name of a weekday ("monday" .. "sunday").
///
/// # Example
///
/// ```
/// use leave_engine::models::weekday_name;
/// use chrono::Weekday;
///
/// assert_eq!(weekday_name(Weekday::Sat), "saturday");
/// ```
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parses a weekday name, case-insensitively. Returns `None` for anything
/// that is not a full English weekday name.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// A named shift with daily hours and a set of weekoff weekdays.
///
/// # Example
///
/// ```
/// use leave_engine::models::WorkShift;
/// use chrono::{NaiveTime, Weekday};
///
/// let shift = WorkShift {
///     id: 1,
///     name: "General".to_string(),
///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
///     weekoffs: vec!["saturday".to_string(), "sunday".to_string()],
/// };
/// assert!(shift.is_weekoff_day(Weekday::Sun));
/// assert!(!shift.is_weekoff_day(Weekday::Mon));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkShift {
    /// Unique identifier for the shift.
    pub id: WorkShiftId,
    /// Display name (e.g., "General").
    pub name: String,
    /// Daily start time.
    pub start_time: NaiveTime,
    /// Daily end time.
    pub end_time: NaiveTime,
    /// Lowercase weekday names that are not worked.
    #[serde(default)]
    pub weekoffs: Vec<String>,
}

impl WorkShift {
    /// Returns true if the given weekday is a weekoff for this shift.
    pub fn is_weekoff_day(&self, weekday: Weekday) -> bool {
        let name = weekday_name(weekday);
        self.weekoffs.iter().any(|w| w.eq_ignore_ascii_case(name))
    }

    /// Returns the weekoff entries that do not name a weekday.
    pub fn unknown_weekoffs(&self) -> Vec<&str> {
        self.weekoffs
            .iter()
            .filter(|w| parse_weekday(w).is_none())
            .map(String::as_str)
            .collect()
    }
}

/// Assignment of an employee to a work shift for a period.
///
/// An open-ended assignment has no `end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkShiftAssignment {
    /// The assigned employee.
    pub employee_id: EmployeeId,
    /// The assigned shift.
    pub work_shift_id: WorkShiftId,
    /// First day the assignment applies.
    pub start_date: NaiveDate,
    /// Last day the assignment applies, or `None` if open-ended.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl WorkShiftAssignment {
    /// Returns true if the assignment has not ended before `date`.
    ///
    /// This is the applicability rule used to pick the shift for a leave
    /// request: the start date of the assignment is not consulted.
    pub fn is_current_on(&self, date: NaiveDate) -> bool {
        self.end_date.is_none_or(|end| end >= date)
    }
}
