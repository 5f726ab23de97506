//! Working day calendar arithmetic.
//!
//! This module provides [`WorkingDayService`], which decides whether a date is
//! a working day for a work shift, walks to the next or previous working day,
//! and counts working days in a range.
//!
//! A working day is a date that is neither a weekoff of the shift nor covered
//! by any holiday. Every holiday applies to every employee, whatever its
//! [`HolidayType`](crate::models::HolidayType).

use chrono::{Datelike, Local, NaiveDate, Weekday};
use tracing::warn;

use crate::config::EngineSettings;
use crate::error::EngineResult;
use crate::models::WorkShift;
use crate::store::LeaveStore;

/// Direction of a working day search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Calendar predicates and day walking over a store's holiday calendar.
///
/// # Example
///
/// ```
/// use leave_engine::config::EngineSettings;
/// use leave_engine::models::WorkShift;
/// use leave_engine::services::WorkingDayService;
/// use leave_engine::store::MemoryStore;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let store = MemoryStore::new();
/// let days = WorkingDayService::new(&store, EngineSettings::default());
/// let shift = WorkShift {
///     id: 1,
///     name: "General".to_string(),
///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
///     weekoffs: vec!["saturday".to_string(), "sunday".to_string()],
/// };
///
/// // 2026-03-06 is a Friday; the next working day is Monday.
/// let friday = NaiveDate::from_ymd_opt(2026, 3, 6).unwrap();
/// let next = days.next_working_day(&shift, Some(friday)).unwrap();
/// assert_eq!(next, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
/// ```
#[derive(Debug)]
pub struct WorkingDayService<'a, S> {
    store: &'a S,
    settings: EngineSettings,
}

impl<S> Clone for WorkingDayService<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for WorkingDayService<'_, S> {}

impl<'a, S: LeaveStore> WorkingDayService<'a, S> {
    /// Creates a service reading holidays from `store`.
    pub fn new(store: &'a S, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    /// Returns true if the weekday of `date` is a weekoff of `shift`.
    pub fn is_weekoff(&self, date: NaiveDate, shift: &WorkShift) -> bool {
        shift.is_weekoff_day(date.weekday())
    }

    /// Returns true if any holiday covers `date`.
    pub fn is_holiday(&self, date: NaiveDate) -> EngineResult<bool> {
        self.store.holiday_exists_on(date)
    }

    /// Returns true if `date` is neither a weekoff nor a holiday.
    pub fn is_working_day(&self, date: NaiveDate, shift: &WorkShift) -> EngineResult<bool> {
        if self.is_weekoff(date, shift) {
            return Ok(false);
        }
        Ok(!self.is_holiday(date)?)
    }

    /// Returns the first working day strictly after `from` (default: today).
    ///
    /// The search examines at most `working_day_search_limit` days. When no
    /// working day is found within that window, the date the search stopped
    /// at is returned even though it is not a working day.
    pub fn next_working_day(
        &self,
        shift: &WorkShift,
        from: Option<NaiveDate>,
    ) -> EngineResult<NaiveDate> {
        let from = from.unwrap_or_else(today);
        self.find_working_day(from, shift, Direction::Forward)
    }

    /// Returns the last working day strictly before `from` (default: today).
    ///
    /// Bounded the same way as [`WorkingDayService::next_working_day`].
    pub fn previous_working_day(
        &self,
        shift: &WorkShift,
        from: Option<NaiveDate>,
    ) -> EngineResult<NaiveDate> {
        let from = from.unwrap_or_else(today);
        self.find_working_day(from, shift, Direction::Backward)
    }

    /// Returns every working day in `[start, end]`, ascending.
    ///
    /// An inverted range yields an empty list.
    pub fn working_days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        shift: &WorkShift,
    ) -> EngineResult<Vec<NaiveDate>> {
        let mut days = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            if self.is_working_day(date, shift)? {
                days.push(date);
            }
        }
        Ok(days)
    }

    /// Returns the number of working days in `[start, end]`.
    pub fn count_working_days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        shift: &WorkShift,
    ) -> EngineResult<usize> {
        Ok(self.working_days_between(start, end, shift)?.len())
    }

    /// Counts days in `[start, end]` that are not holidays, without
    /// consulting a work shift.
    ///
    /// Saturdays and Sundays are skipped unless `include_weekends` is set.
    /// Returns 0 if `start > end`.
    pub fn working_days_count(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        include_weekends: bool,
    ) -> EngineResult<usize> {
        if start > end {
            return Ok(0);
        }

        let mut count = 0;
        for date in start.iter_days().take_while(|d| *d <= end) {
            if self.is_holiday(date)? {
                continue;
            }
            if include_weekends || !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// [`WorkingDayService::working_days_count`] with the configured
    /// weekend default.
    pub fn working_days_count_default(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<usize> {
        self.working_days_count(start, end, self.settings.fallback_include_weekends)
    }

    fn find_working_day(
        &self,
        from: NaiveDate,
        shift: &WorkShift,
        direction: Direction,
    ) -> EngineResult<NaiveDate> {
        let step = |date: NaiveDate| match direction {
            Direction::Forward => date.succ_opt(),
            Direction::Backward => date.pred_opt(),
        };

        let Some(mut current) = step(from) else {
            return Ok(from);
        };

        for _ in 0..self.settings.working_day_search_limit {
            if self.is_working_day(current, shift)? {
                return Ok(current);
            }
            match step(current) {
                Some(next) => current = next,
                None => break,
            }
        }

        warn!(
            work_shift = %shift.name,
            from = %from,
            reached = %current,
            limit = self.settings.working_day_search_limit,
            "No working day found within search limit"
        );
        Ok(current)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
