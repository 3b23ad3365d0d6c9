//! Month/day window for "birthdays within N days" queries.
//!
//! # Invariants
//! - Only month and day take part in comparisons; the stored year is ignored.
//! - The window is closed: `[today, today + days]`.
//! - When `today + days` falls in a later calendar year the window wraps
//!   across December/January and membership becomes `key >= start || key <= end`.
//! - A window of a year or more contains every month/day.

use chrono::{Datelike, Days, NaiveDate};

/// Calendar month and day, ordered by `month * 100 + day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Integer sort key, e.g. March 7 -> `307`, December 28 -> `1228`.
    pub fn key(self) -> u32 {
        self.month * 100 + self.day
    }
}

/// Closed month/day interval starting today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthdayWindow {
    start: MonthDay,
    end: MonthDay,
    wraps: bool,
    full_year: bool,
}

/// Shortest span that reaches every month/day from any start date.
const FULL_YEAR_DAYS: u32 = 365;

impl BirthdayWindow {
    /// Builds the window `[today, today + days]`.
    ///
    /// Saturates at the last representable date instead of overflowing.
    pub fn new(today: NaiveDate, days: u32) -> Self {
        let last_day = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        Self {
            start: MonthDay::of(today),
            end: MonthDay::of(last_day),
            wraps: last_day.year() != today.year(),
            full_year: days >= FULL_YEAR_DAYS,
        }
    }

    pub fn start(&self) -> MonthDay {
        self.start
    }

    pub fn end(&self) -> MonthDay {
        self.end
    }

    /// Whether the window crosses a year boundary.
    pub fn wraps(&self) -> bool {
        self.wraps
    }

    /// Whether every month/day falls inside the window.
    pub fn covers_full_year(&self) -> bool {
        self.full_year
    }

    pub fn contains(&self, birthday: NaiveDate) -> bool {
        self.contains_key(MonthDay::of(birthday).key())
    }

    /// Membership test on a `MonthDay::key` value.
    pub fn contains_key(&self, key: u32) -> bool {
        if self.full_year {
            return true;
        }
        let start = self.start.key();
        let end = self.end.key();
        if self.wraps {
            key >= start || key <= end
        } else {
            start <= key && key <= end
        }
    }
}
