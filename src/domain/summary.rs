use serde::Serialize;

use super::{record::Mode, year_month::YearMonth};

/// Label of the synthetic bucket produced by a top-N collapse.
pub const OTHER_CATEGORY: &str = "other";

/// `income - expense` without overflow.
pub(crate) fn signed_net(income: u64, expense: u64) -> i64 {
    let net = i128::from(income) - i128::from(expense);
    net.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub income_total: u64,
    pub expense_total: u64,
}

impl DaySummary {
    pub fn add(&mut self, mode: Mode, amount: u64) {
        match mode {
            Mode::Income => self.income_total = self.income_total.saturating_add(amount),
            Mode::Expense => self.expense_total = self.expense_total.saturating_add(amount),
        }
    }

    pub fn net(&self) -> i64 {
        signed_net(self.income_total, self.expense_total)
    }

    pub fn is_empty(&self) -> bool {
        self.income_total == 0 && self.expense_total == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub year_month: YearMonth,
    pub income_total: u64,
    pub expense_total: u64,
    pub net: i64,
}

impl MonthSummary {
    pub fn empty(year_month: YearMonth) -> Self {
        Self {
            year_month,
            income_total: 0,
            expense_total: 0,
            net: 0,
        }
    }

    pub fn add(&mut self, mode: Mode, amount: u64) {
        match mode {
            Mode::Income => self.income_total = self.income_total.saturating_add(amount),
            Mode::Expense => self.expense_total = self.expense_total.saturating_add(amount),
        }
        self.net = signed_net(self.income_total, self.expense_total);
    }
}

/// All-time net, independent of any month filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunningBalance {
    pub income_total: u64,
    pub expense_total: u64,
    pub net: i64,
}

impl RunningBalance {
    pub fn add(&mut self, mode: Mode, amount: u64) {
        match mode {
            Mode::Income => self.income_total = self.income_total.saturating_add(amount),
            Mode::Expense => self.expense_total = self.expense_total.saturating_add(amount),
        }
        self.net = signed_net(self.income_total, self.expense_total);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: u64,
}

/// Category totals for one mode, largest first. Equal totals keep the order
/// in which their categories were first seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRanking {
    pub mode: Mode,
    pub entries: Vec<CategoryTotal>,
}

impl CategoryRanking {
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |sum, entry| sum.saturating_add(entry.total))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pairs(&self) -> Vec<(&str, u64)> {
        self.entries
            .iter()
            .map(|entry| (entry.category.as_str(), entry.total))
            .collect()
    }

    /// Keeps the first `top_n` entries and merges the rest into a single
    /// `other_label` bucket. The bucket only appears when its sum is positive.
    pub fn collapse_top_n(&self, top_n: usize, other_label: &str) -> CategoryRanking {
        let mut entries: Vec<CategoryTotal> = self.entries.iter().take(top_n).cloned().collect();
        let rest = self
            .entries
            .iter()
            .skip(top_n)
            .fold(0u64, |sum, entry| sum.saturating_add(entry.total));
        if rest > 0 {
            entries.push(CategoryTotal {
                category: other_label.to_string(),
                total: rest,
            });
        }
        CategoryRanking {
            mode: self.mode,
            entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRankings {
    pub expense: CategoryRanking,
    pub income: CategoryRanking,
}

impl CategoryRankings {
    pub fn get(&self, mode: Mode) -> &CategoryRanking {
        match mode {
            Mode::Expense => &self.expense,
            Mode::Income => &self.income,
        }
    }
}
