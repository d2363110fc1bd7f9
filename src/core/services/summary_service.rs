use serde::Serialize;

use crate::domain::{CategoryRanking, Mode, MonthSummary, Record, RunningBalance, YearMonth};
use crate::ledger::aggregate;

/// Figures shown on the history screen for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthReport {
    pub month: MonthSummary,
    pub balance: RunningBalance,
    pub expense_ranking: CategoryRanking,
    pub income_ranking: CategoryRanking,
}

impl MonthReport {
    pub fn ranking(&self, mode: Mode) -> &CategoryRanking {
        match mode {
            Mode::Expense => &self.expense_ranking,
            Mode::Income => &self.income_ranking,
        }
    }
}

pub struct SummaryService;

impl SummaryService {
    /// Month totals for `year_month`, the all-time balance, and both category
    /// rankings collapsed to `top_n` entries plus an `other_label` bucket.
    pub fn report(
        records: &[Record],
        year_month: YearMonth,
        top_n: usize,
        other_label: &str,
    ) -> MonthReport {
        let aggregation = aggregate(records, year_month);
        MonthReport {
            month: aggregation.month_summary,
            balance: aggregation.running_balance,
            expense_ranking: aggregation
                .rankings
                .expense
                .collapse_top_n(top_n, other_label),
            income_ranking: aggregation
                .rankings
                .income
                .collapse_top_n(top_n, other_label),
        }
    }

    /// Percentage of `total` taken by `part`, rounded to one decimal.
    pub fn share_percent(part: u64, total: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let ratio = part as f64 / total as f64 * 100.0;
        (ratio * 10.0).round() / 10.0
    }
}
