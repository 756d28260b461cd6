//! Simulated calendar and its day, month, and year notifications.
//!
//! The calendar is the single source of truth for the current simulated
//! date. Each call to [`Calendar::advance`] moves forward exactly one day
//! and reports every boundary crossed on the way.
//!
//! # Design Principles
//!
//! - Years are signed and counted astronomically: the year after `-1` is `0`.
//! - Boundaries are reported largest first, so on the first of January the
//!   order is `NewYear`, `NewMonth`, `NewDay`.
//! - Overflow of the year counter is an error, never a wrap.

use civitas_types::{SimDate, days_in_month};

/// Errors that can occur during calendar operations.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    /// The year counter would overflow.
    #[error("year counter overflow: cannot advance beyond year {year}")]
    YearOverflow {
        /// Last representable year.
        year: i32,
    },

    /// The calendar was started on a date that does not exist.
    #[error("invalid start date {year}-{month}-{day}")]
    InvalidDate {
        /// Year.
        year: i32,
        /// Month.
        month: u32,
        /// Day.
        day: u32,
    },
}

/// A boundary crossed when the calendar advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarNotification {
    /// A new year began.
    NewYear(i32),
    /// A new month began.
    NewMonth {
        /// Year.
        year: i32,
        /// Month, 1 through 12.
        month: u32,
    },
    /// A new day began.
    NewDay(SimDate),
}

/// Day counter over the fixed 365-day calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    /// The day most recently reached.
    today: SimDate,

    /// Days advanced since construction.
    days_elapsed: u64,
}

impl Calendar {
    /// Create a calendar standing on `start`.
    pub const fn new(start: SimDate) -> Self {
        Self {
            today: start,
            days_elapsed: 0,
        }
    }

    /// Create a calendar from raw date parts.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDate`] when the date does not exist.
    pub fn from_parts(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        SimDate::new(year, month, day)
            .map(Self::new)
            .ok_or(CalendarError::InvalidDate { year, month, day })
    }

    /// Advance one day and return the boundaries crossed, largest first.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::YearOverflow`] past `i32::MAX`.
    pub fn advance(&mut self) -> Result<Vec<CalendarNotification>, CalendarError> {
        let SimDate { year, month, day } = self.today;
        let month_length = days_in_month(month).unwrap_or(28);

        let next = if day < month_length {
            SimDate {
                year,
                month,
                day: day.saturating_add(1),
            }
        } else if month < 12 {
            SimDate {
                year,
                month: month.saturating_add(1),
                day: 1,
            }
        } else {
            let next_year = year
                .checked_add(1)
                .ok_or(CalendarError::YearOverflow { year })?;
            SimDate {
                year: next_year,
                month: 1,
                day: 1,
            }
        };

        let mut notifications = Vec::with_capacity(3);
        if next.is_year_start() {
            notifications.push(CalendarNotification::NewYear(next.year));
        }
        if next.is_month_start() {
            notifications.push(CalendarNotification::NewMonth {
                year: next.year,
                month: next.month,
            });
        }
        notifications.push(CalendarNotification::NewDay(next));

        self.today = next;
        self.days_elapsed = self.days_elapsed.saturating_add(1);
        Ok(notifications)
    }

    /// The day most recently reached.
    pub const fn today(&self) -> SimDate {
        self.today
    }

    /// Days advanced since construction.
    pub const fn days_elapsed(&self) -> u64 {
        self.days_elapsed
    }
}
