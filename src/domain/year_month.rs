use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::errors::LedgerError;

// Keeps every first-of-month representable by `NaiveDate`.
const MIN_YEAR: i32 = -262_000;
const MAX_YEAR: i32 = 262_000;

/// A calendar month, always holding a month in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Strict constructor; `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self {
                year: year.clamp(MIN_YEAR, MAX_YEAR),
                month,
            })
        } else {
            None
        }
    }

    /// Rolls out-of-range months across year boundaries: month 13 is January
    /// of the next year, month 0 is December of the previous one.
    pub fn rolled(year: i32, month: i32) -> Self {
        let index = i64::from(year) * 12 + i64::from(month) - 1;
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;
        let year = year.clamp(i64::from(MIN_YEAR), i64::from(MAX_YEAR)) as i32;
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::rolled(date.year(), date.month() as i32)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn shift(self, delta: i32) -> Self {
        Self::rolled(self.year, self.month as i32 + delta)
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }

    pub fn previous(self) -> Self {
        self.shift(-1)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Length of the month, computed as "day 0 of the next month".
    pub fn days_in_month(&self) -> u32 {
        self.next()
            .first_day()
            .pred_opt()
            .map(|last| last.day())
            .unwrap_or(31)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = LedgerError;

    /// Accepts `YYYY-MM` and `YYYY/M`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidInput(format!("`{raw}` is not a year-month"));
        let (year, month) = raw
            .trim()
            .split_once(['-', '/'])
            .ok_or_else(invalid)?;
        let year = year.trim().parse::<i32>().map_err(|_| invalid())?;
        let month = month.trim().parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn rolled_wraps_year_boundaries() {
        assert_eq!(YearMonth::rolled(2024, 13), ym(2025, 1));
        assert_eq!(YearMonth::rolled(2024, 0), ym(2023, 12));
        assert_eq!(YearMonth::rolled(2024, -12), ym(2022, 12));
        assert_eq!(YearMonth::rolled(2024, 25), ym(2026, 1));
    }

    #[test]
    fn navigation_crosses_december() {
        assert_eq!(ym(2024, 12).next(), ym(2025, 1));
        assert_eq!(ym(2025, 1).previous(), ym(2024, 12));
        assert_eq!(ym(2024, 6).shift(-18), ym(2022, 12));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(ym(2024, 2).days_in_month(), 29);
        assert_eq!(ym(2023, 2).days_in_month(), 28);
        assert_eq!(ym(1900, 2).days_in_month(), 28);
        assert_eq!(ym(2000, 2).days_in_month(), 29);
        assert_eq!(ym(2024, 4).days_in_month(), 30);
        assert_eq!(ym(2024, 12).days_in_month(), 31);
    }

    #[test]
    fn parses_and_displays() {
        assert_eq!("2024-03".parse::<YearMonth>().unwrap(), ym(2024, 3));
        assert_eq!("2024/3".parse::<YearMonth>().unwrap(), ym(2024, 3));
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
        assert_eq!(ym(2024, 3).to_string(), "2024-03");
    }

    #[test]
    fn new_rejects_out_of_range_months() {
        assert!(YearMonth::new(2024, 0).is_none());
        assert!(YearMonth::new(2024, 13).is_none());
    }
}
