//! Configuration loading and management for the leave engine.
//!
//! This module provides functionality to load a leave policy from YAML files,
//! including engine settings, the leave type and work shift catalogues, and
//! the holiday calendar.
//!
//! # Example
//!
//! ```no_run
//! use leave_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded policy: {}", config.policy().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, EngineFile, EngineSettings, HolidayCalendar, LeaveTypesConfig, PolicyMetadata,
    WorkShiftsConfig,
};
