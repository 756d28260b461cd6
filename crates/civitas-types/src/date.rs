//! Simulated calendar dates.
//!
//! The simulation uses a fixed 365-day year with twelve months and no leap
//! days. Years are signed so that dates before the common era are plain
//! negative numbers (`-248` is 248 BCE).

use serde::{Deserialize, Serialize};

/// Number of days in every simulated year.
pub const DAYS_PER_YEAR: u32 = 365;

/// Month lengths for the fixed 365-day calendar, January first.
const MONTH_LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Return the number of days in `month` (1-based), or `None` for a month
/// outside `1..=12`.
pub fn days_in_month(month: u32) -> Option<u32> {
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTH_LENGTHS.get(index).copied()
}

/// A single day on the simulated calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimDate {
    /// Signed year (negative before the common era).
    pub year: i32,
    /// Month of the year, 1 through 12.
    pub month: u32,
    /// Day of the month, 1 through the month's length.
    pub day: u32,
}

impl SimDate {
    /// Build a date, returning `None` when month or day is out of range.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        let length = days_in_month(month)?;
        if day == 0 || day > length {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Whether this is the first day of a month.
    pub const fn is_month_start(&self) -> bool {
        self.day == 1
    }

    /// Whether this is the first day of a year.
    pub const fn is_year_start(&self) -> bool {
        self.month == 1 && self.day == 1
    }
}

impl core::fmt::Display for SimDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.year < 0 {
            write!(
                f,
                "{} BCE-{:02}-{:02}",
                self.year.unsigned_abs(),
                self.month,
                self.day
            )
        } else {
            write!(f, "{} CE-{:02}-{:02}", self.year, self.month, self.day)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lengths_sum_to_year() {
        let total: u32 = (1..=12).filter_map(days_in_month).sum();
        assert_eq!(total, DAYS_PER_YEAR);
    }

    #[test]
    fn rejects_out_of_range_dates() {
        assert!(SimDate::new(-248, 2, 29).is_none());
        assert!(SimDate::new(-248, 13, 1).is_none());
        assert!(SimDate::new(-248, 0, 1).is_none());
        assert!(SimDate::new(-248, 4, 0).is_none());
        assert!(SimDate::new(-248, 12, 31).is_some());
    }

    #[test]
    fn displays_era() {
        let date = SimDate::new(-248, 3, 12);
        assert_eq!(date.map(|d| d.to_string()), Some("248 BCE-03-12".to_owned()));
    }
}
