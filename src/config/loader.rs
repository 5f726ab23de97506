//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading leave policy
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{Holiday, LeaveType, WorkShift};

use super::types::{
    EngineConfig, EngineFile, EngineSettings, HolidayCalendar, LeaveTypesConfig, PolicyMetadata,
    WorkShiftsConfig,
};

/// Loads and provides access to leave policy configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query leave types, work shifts and holidays.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── engine.yaml        # Policy metadata and engine settings
/// ├── leave_types.yaml   # Leave type catalogue
/// ├── work_shifts.yaml   # Work shift catalogue
/// └── holidays/
///     └── 2026.yaml      # Holiday calendar, one file per year
/// ```
///
/// # Example
///
/// ```no_run
/// use leave_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
///
/// let casual = loader.get_leave_type("casual").unwrap();
/// println!("{} grants {} days a year", casual.name, casual.yearly_grant);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/default")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - The parsed data is inconsistent (`InvalidConfig`)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use leave_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/default")?;
    /// # Ok::<(), leave_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine = Self::load_yaml::<EngineFile>(&path.join("engine.yaml"))?;
        let leave_types = Self::load_yaml::<LeaveTypesConfig>(&path.join("leave_types.yaml"))?;
        let work_shifts = Self::load_yaml::<WorkShiftsConfig>(&path.join("work_shifts.yaml"))?;
        let holidays = Self::load_holidays(&path.join("holidays"))?;

        let config = EngineConfig::new(
            engine.policy,
            engine.settings,
            leave_types.leave_types,
            work_shifts.work_shifts,
            holidays,
        );
        config.validate()?;

        debug!(
            path = %path.display(),
            leave_types = config.leave_types().len(),
            work_shifts = config.work_shifts().len(),
            holidays = config.holidays().len(),
            "Loaded leave policy configuration"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every calendar file from the holidays directory.
    fn load_holidays(holidays_dir: &Path) -> EngineResult<Vec<Holiday>> {
        let holidays_dir_str = holidays_dir.display().to_string();

        if !holidays_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: holidays_dir_str,
            });
        }

        let entries = fs::read_dir(holidays_dir).map_err(|_| EngineError::ConfigNotFound {
            path: holidays_dir_str.clone(),
        })?;

        let mut calendars = 0;
        let mut holidays = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: holidays_dir_str.clone(),
            })?;

            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
            {
                let calendar = Self::load_yaml::<HolidayCalendar>(&path)?;
                if let Some(stray) = calendar
                    .holidays
                    .iter()
                    .find(|h| h.from_date.format("%Y").to_string() != calendar.year.to_string())
                {
                    warn!(
                        file = %path.display(),
                        year = calendar.year,
                        holiday = %stray.name,
                        "Holiday starts outside its calendar year"
                    );
                }
                calendars += 1;
                holidays.extend(calendar.holidays);
            }
        }

        if calendars == 0 {
            return Err(EngineError::InvalidConfig {
                message: format!("{} (no holiday calendars found)", holidays_dir_str),
            });
        }

        Ok(holidays)
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the policy metadata.
    pub fn policy(&self) -> &PolicyMetadata {
        self.config.policy()
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> EngineSettings {
        self.config.settings()
    }

    /// Gets a leave type by its code.
    ///
    /// # Arguments
    ///
    /// * `code` - The leave type code (e.g., "casual")
    ///
    /// # Returns
    ///
    /// Returns the leave type if found, or `InvalidConfig` naming the code.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use leave_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/default")?;
    /// let earned = loader.get_leave_type("earned")?;
    /// assert!(earned.is_sandwich_type);
    /// # Ok::<(), leave_engine::error::EngineError>(())
    /// ```
    pub fn get_leave_type(&self, code: &str) -> EngineResult<&LeaveType> {
        self.config
            .leave_types()
            .iter()
            .find(|lt| lt.code == code)
            .ok_or_else(|| EngineError::InvalidConfig {
                message: format!("unknown leave type code '{}'", code),
            })
    }

    /// Gets a work shift by name, case-insensitively.
    pub fn get_work_shift(&self, name: &str) -> EngineResult<&WorkShift> {
        self.config
            .work_shifts()
            .iter()
            .find(|ws| ws.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| EngineError::InvalidConfig {
                message: format!("unknown work shift '{}'", name),
            })
    }

    /// Returns all configured holidays, sorted by start date.
    pub fn holidays(&self) -> &[Holiday] {
        self.config.holidays()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.policy().name, "Default Leave Policy");
        assert_eq!(loader.settings(), EngineSettings::default());
    }

    #[test]
    fn test_get_leave_type() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let casual = loader.get_leave_type("casual").unwrap();
        assert_eq!(casual.name, "Casual Leave");
        assert_eq!(casual.yearly_grant, dec("12"));
        assert!(!casual.is_sandwich_type);

        let earned = loader.get_leave_type("earned").unwrap();
        assert!(earned.is_sandwich_type);
    }

    #[test]
    fn test_get_leave_type_unknown_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_leave_type("unknown") {
            Err(EngineError::InvalidConfig { message }) => assert!(message.contains("unknown")),
            other => panic!("Expected InvalidConfig error, got {:?}", other),
        }
    }

    #[test]
    fn test_get_work_shift_is_case_insensitive() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let shift = loader.get_work_shift("general").unwrap();
        assert!(shift.is_weekoff_day(Weekday::Sat));
        assert!(shift.is_weekoff_day(Weekday::Sun));

        let retail = loader.get_work_shift("Retail").unwrap();
        assert!(retail.is_weekoff_day(Weekday::Mon));
        assert!(!retail.is_weekoff_day(Weekday::Sat));
    }

    #[test]
    fn test_holidays_loaded_and_sorted() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let holidays = loader.holidays();
        assert!(!holidays.is_empty());
        assert!(holidays.windows(2).all(|w| w[0].from_date <= w[1].from_date));

        let republic_day = NaiveDate::from_ymd_opt(2026, 1, 26).unwrap();
        assert!(holidays.iter().any(|h| h.covers(republic_day)));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
