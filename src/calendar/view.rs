use chrono::NaiveDate;

use crate::domain::{DaySummary, MonthSummary, Record, RunningBalance, YearMonth};
use crate::ledger::aggregate;

use super::grid::{grid_for, weeks, CalendarCell, DAYS_PER_WEEK};

/// A calendar cell joined with the totals recorded on its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub cell: CalendarCell,
    pub summary: Option<DaySummary>,
    pub is_today: bool,
}

/// Everything the calendar heat-map shows for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub year_month: YearMonth,
    pub cells: Vec<DayCell>,
    pub month_summary: MonthSummary,
    pub running_balance: RunningBalance,
}

impl MonthView {
    pub fn build(records: &[Record], year_month: YearMonth, today: NaiveDate) -> Self {
        let aggregation = aggregate(records, year_month);
        let cells = grid_for(year_month)
            .into_iter()
            .map(|cell| DayCell {
                cell,
                summary: cell
                    .date()
                    .and_then(|date| aggregation.day_summaries.get(&date).copied()),
                is_today: cell.date() == Some(today),
            })
            .collect();
        Self {
            year_month,
            cells,
            month_summary: aggregation.month_summary,
            running_balance: aggregation.running_balance,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(DAYS_PER_WEEK)
    }

    /// Largest single-day expense this month, used to scale heat colours.
    pub fn peak_expense(&self) -> u64 {
        self.cells
            .iter()
            .filter_map(|cell| cell.summary.map(|summary| summary.expense_total))
            .max()
            .unwrap_or(0)
    }

    /// Expense heat of a cell on a `0..=levels` scale relative to the
    /// month's peak. Blank and empty days are level 0.
    pub fn heat_level(&self, cell: &DayCell, levels: u8) -> u8 {
        let peak = self.peak_expense();
        let expense = cell.summary.map(|summary| summary.expense_total).unwrap_or(0);
        if peak == 0 || expense == 0 || levels == 0 {
            return 0;
        }
        let peak = u128::from(peak);
        let scaled = (u128::from(expense) * u128::from(levels) + peak - 1) / peak;
        scaled.min(u128::from(levels)) as u8
    }
}

/// Plain grid rows without totals, for callers that only lay out dates.
pub fn grid_rows(year_month: YearMonth) -> Vec<Vec<CalendarCell>> {
    weeks(&grid_for(year_month)).map(<[CalendarCell]>::to_vec).collect()
}
