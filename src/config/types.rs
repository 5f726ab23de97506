//! Configuration types for the leave engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{EngineError, EngineResult};
use crate::models::{Holiday, LeaveType, WorkShift};

/// Identifying information about a leave policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Human-readable policy name.
    pub name: String,
    /// The version or effective date of the policy.
    pub version: String,
}

/// Tunable constants used by the services.
///
/// # Example
///
/// ```
/// use leave_engine::config::EngineSettings;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let settings = EngineSettings::default();
/// assert_eq!(settings.working_day_search_limit, 365);
/// assert_eq!(settings.half_day_value, Decimal::from_str("0.5").unwrap());
/// assert!(!settings.fallback_include_weekends);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Maximum number of days a next/previous working day search walks
    /// before giving up and returning the date it reached.
    pub working_day_search_limit: u32,
    /// Days charged for a half-day request.
    pub half_day_value: Decimal,
    /// Whether the shift-independent day count includes Saturdays and
    /// Sundays by default.
    pub fallback_include_weekends: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            working_day_search_limit: 365,
            half_day_value: Decimal::new(5, 1),
            fallback_include_weekends: false,
        }
    }
}

/// Contents of `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineFile {
    /// Policy metadata.
    pub policy: PolicyMetadata,
    /// Engine settings; omitted keys take their defaults.
    #[serde(default)]
    pub settings: EngineSettings,
}

/// Contents of `leave_types.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveTypesConfig {
    /// The leave type catalogue.
    pub leave_types: Vec<LeaveType>,
}

/// Contents of `work_shifts.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkShiftsConfig {
    /// The work shift catalogue.
    pub work_shifts: Vec<WorkShift>,
}

/// Contents of one file in the `holidays/` directory.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidayCalendar {
    /// The calendar year the file describes.
    pub year: i32,
    /// Holidays observed that year.
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

/// Complete engine configuration.
///
/// Holidays from every calendar file are merged and sorted by start date.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    policy: PolicyMetadata,
    settings: EngineSettings,
    leave_types: Vec<LeaveType>,
    work_shifts: Vec<WorkShift>,
    holidays: Vec<Holiday>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        policy: PolicyMetadata,
        settings: EngineSettings,
        leave_types: Vec<LeaveType>,
        work_shifts: Vec<WorkShift>,
        holidays: Vec<Holiday>,
    ) -> Self {
        let mut sorted_holidays = holidays;
        sorted_holidays.sort_by(|a, b| a.from_date.cmp(&b.from_date).then(a.id.cmp(&b.id)));
        Self {
            policy,
            settings,
            leave_types,
            work_shifts,
            holidays: sorted_holidays,
        }
    }

    /// Checks the configuration for inconsistencies YAML parsing cannot catch.
    ///
    /// # Returns
    ///
    /// Returns `InvalidConfig` if:
    /// - the search limit is zero or the half-day value is not positive
    /// - two leave types, work shifts or holidays share an id
    /// - two leave types share a code
    /// - a work shift names an unknown weekoff day
    /// - a holiday ends before it starts
    pub fn validate(&self) -> EngineResult<()> {
        if self.settings.working_day_search_limit == 0 {
            return Err(invalid("working_day_search_limit must be at least 1"));
        }
        if self.settings.half_day_value <= Decimal::ZERO {
            return Err(invalid("half_day_value must be positive"));
        }

        let mut ids = HashSet::new();
        let mut codes = HashSet::new();
        for leave_type in &self.leave_types {
            if !ids.insert(leave_type.id) {
                return Err(invalid(format!("duplicate leave type id {}", leave_type.id)));
            }
            if !codes.insert(leave_type.code.as_str()) {
                return Err(invalid(format!(
                    "duplicate leave type code '{}'",
                    leave_type.code
                )));
            }
        }

        let mut ids = HashSet::new();
        for shift in &self.work_shifts {
            if !ids.insert(shift.id) {
                return Err(invalid(format!("duplicate work shift id {}", shift.id)));
            }
            if let Some(unknown) = shift.unknown_weekoffs().first() {
                return Err(invalid(format!(
                    "work shift '{}' has unknown weekoff '{}'",
                    shift.name, unknown
                )));
            }
        }

        let mut ids = HashSet::new();
        for holiday in &self.holidays {
            if !ids.insert(holiday.id) {
                return Err(invalid(format!("duplicate holiday id {}", holiday.id)));
            }
            if holiday.from_date > holiday.to_date {
                return Err(invalid(format!(
                    "holiday '{}' ends ({}) before it starts ({})",
                    holiday.name, holiday.to_date, holiday.from_date
                )));
            }
        }

        Ok(())
    }

    /// Returns the policy metadata.
    pub fn policy(&self) -> &PolicyMetadata {
        &self.policy
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Returns the leave type catalogue.
    pub fn leave_types(&self) -> &[LeaveType] {
        &self.leave_types
    }

    /// Returns the work shift catalogue.
    pub fn work_shifts(&self) -> &[WorkShift] {
        &self.work_shifts
    }

    /// Returns all holidays, sorted by start date.
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }
}

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        message: message.into(),
    }
}
