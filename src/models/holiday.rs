//! Holiday calendar model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::HolidayId;

/// Scope flag carried by a holiday.
///
/// Working-day calculations currently treat both kinds as applying to every
/// employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayType {
    /// Observed by the whole organisation.
    #[default]
    Global,
    /// Observed by part of the organisation.
    Sectional,
}

impl std::fmt::Display for HolidayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HolidayType::Global => write!(f, "Global"),
            HolidayType::Sectional => write!(f, "Sectional"),
        }
    }
}

/// A holiday spanning the inclusive range `[from_date, to_date]`.
///
/// # Example
///
/// ```
/// use leave_engine::models::{Holiday, HolidayType};
/// use chrono::NaiveDate;
///
/// let diwali = Holiday {
///     id: 1,
///     name: "Diwali".to_string(),
///     from_date: NaiveDate::from_ymd_opt(2026, 11, 8).unwrap(),
///     to_date: NaiveDate::from_ymd_opt(2026, 11, 9).unwrap(),
///     holiday_type: HolidayType::Global,
/// };
/// assert!(diwali.covers(NaiveDate::from_ymd_opt(2026, 11, 9).unwrap()));
/// assert_eq!(diwali.days(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// Unique identifier for the holiday.
    pub id: HolidayId,
    /// Name of the holiday.
    pub name: String,
    /// First day of the holiday.
    pub from_date: NaiveDate,
    /// Last day of the holiday.
    pub to_date: NaiveDate,
    /// Scope flag.
    #[serde(default)]
    pub holiday_type: HolidayType,
}

impl Holiday {
    /// Returns true if `date` falls within the holiday's range.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.from_date <= date && date <= self.to_date
    }

    /// Number of calendar days in the holiday, zero for an inverted range.
    pub fn days(&self) -> i64 {
        ((self.to_date - self.from_date).num_days() + 1).max(0)
    }
}
