//! Month matrices for the calendar screen.

pub mod grid;
pub mod view;

pub use grid::{build_month_grid, grid_for, weeks, CalendarCell, DAYS_PER_WEEK, GRID_CELLS};
pub use view::{grid_rows, DayCell, MonthView};
