//! Calendar-month processing unit
//!
//! A [`Period`] identifies one calendar-month slice of data to extract,
//! export, and validate. It uniquely keys every other structure in the
//! pipeline and is immutable once created.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One calendar-month slice, identified by `(year, month)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// Create a new period. `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month), "month must be 1-12");
        Self { year, month }
    }

    /// The current calendar month in local time
    pub fn current() -> Self {
        let now = chrono::Local::now();
        Self::new(now.year(), now.month())
    }

    /// Number of days in this period's month, leap-year aware
    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };

        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .map(|d| d.day())
            .unwrap_or(30)
    }

    /// Inclusive day range of this month: `(day_start, day_end)`
    pub fn day_range(&self) -> (u32, u32) {
        (1, self.days_in_month())
    }

    /// Human-readable label like "July 2025"
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }

    /// Date suffix for export filenames, like "2025_07_01_31"
    pub fn filename_suffix(&self) -> String {
        let (day_start, day_end) = self.day_range();
        format!(
            "{}_{:02}_{:02}_{:02}",
            self.year, self.month, day_start, day_end
        )
    }

    /// The period immediately before this one
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// The window of `length` consecutive periods ending at `end`, in
    /// chronological order
    pub fn window_ending(end: Period, length: u32) -> Vec<Period> {
        let mut periods = Vec::with_capacity(length as usize);
        let mut cursor = end;
        for _ in 0..length {
            periods.push(cursor);
            cursor = cursor.previous();
        }
        periods.reverse();
        periods
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_crosses_year_boundary() {
        let window = Period::window_ending(Period::new(2025, 7), 12);

        assert_eq!(window.len(), 12);
        assert_eq!(window[0], Period::new(2024, 8));
        assert_eq!(window[11], Period::new(2025, 7));

        // Strictly chronological
        for pair in window.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_window_within_single_year() {
        let window = Period::window_ending(Period::new(2025, 12), 3);
        assert_eq!(
            window,
            vec![
                Period::new(2025, 10),
                Period::new(2025, 11),
                Period::new(2025, 12)
            ]
        );
    }

    #[test]
    fn test_days_in_month_leap_year() {
        assert_eq!(Period::new(2024, 2).days_in_month(), 29);
        assert_eq!(Period::new(2025, 2).days_in_month(), 28);
        assert_eq!(Period::new(2025, 12).days_in_month(), 31);
        assert_eq!(Period::new(2025, 4).days_in_month(), 30);
    }

    #[test]
    fn test_label_and_display() {
        let period = Period::new(2025, 7);
        assert_eq!(period.label(), "July 2025");
        assert_eq!(period.to_string(), "2025-07");
    }

    #[test]
    fn test_filename_suffix() {
        assert_eq!(Period::new(2025, 1).filename_suffix(), "2025_01_01_31");
        assert_eq!(Period::new(2024, 2).filename_suffix(), "2024_02_01_29");
    }

    #[test]
    fn test_ordering_is_chronological() {
        assert!(Period::new(2024, 12) < Period::new(2025, 1));
        assert!(Period::new(2025, 1) < Period::new(2025, 2));
    }
}
