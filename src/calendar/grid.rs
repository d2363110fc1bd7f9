use chrono::{Datelike, NaiveDate};

use crate::domain::YearMonth;

/// Six full weeks, whatever the month.
pub const GRID_CELLS: usize = 42;
pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarCell {
    Blank,
    Day { day: u32, date: NaiveDate },
}

impl CalendarCell {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            CalendarCell::Day { date, .. } => Some(*date),
            CalendarCell::Blank => None,
        }
    }

    pub fn day(&self) -> Option<u32> {
        match self {
            CalendarCell::Day { day, .. } => Some(*day),
            CalendarCell::Blank => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CalendarCell::Blank)
    }
}

/// Builds the month matrix for `(year, month)`. Out-of-range months roll
/// into the neighbouring year, so month 13 renders January of `year + 1`.
pub fn build_month_grid(year: i32, month: i32) -> Vec<CalendarCell> {
    grid_for(YearMonth::rolled(year, month))
}

/// Leading blanks up to the weekday of the 1st (Sunday first), one cell per
/// day, then trailing blanks up to [`GRID_CELLS`].
pub fn grid_for(year_month: YearMonth) -> Vec<CalendarCell> {
    let first = year_month.first_day();
    let leading = first.weekday().num_days_from_sunday() as usize;

    let mut cells = Vec::with_capacity(GRID_CELLS);
    cells.extend(std::iter::repeat(CalendarCell::Blank).take(leading));
    cells.extend(
        first
            .iter_days()
            .take(year_month.days_in_month() as usize)
            .map(|date| CalendarCell::Day {
                day: date.day(),
                date,
            }),
    );
    cells.resize(GRID_CELLS, CalendarCell::Blank);
    cells
}

/// Splits a grid into its week rows.
pub fn weeks(cells: &[CalendarCell]) -> impl Iterator<Item = &[CalendarCell]> {
    cells.chunks(DAYS_PER_WEEK)
}
