//! Pure aggregation over normalized records.
//!
//! Nothing in here fails: every record contributes to every view it belongs
//! to, and all sums use saturating integer arithmetic.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use chrono::NaiveDate;

use crate::domain::{
    CategoryRanking, CategoryRankings, CategoryTotal, DaySummary, Mode, MonthSummary, Record,
    RunningBalance, YearMonth, UNCATEGORIZED,
};

/// Every view derived from one record set and a reference month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Keyed by the full calendar date, so equal month/day pairs in
    /// different years never share a bucket.
    pub day_summaries: BTreeMap<NaiveDate, DaySummary>,
    pub month_summary: MonthSummary,
    pub running_balance: RunningBalance,
    pub rankings: CategoryRankings,
}

impl Aggregation {
    pub fn day(&self, date: NaiveDate) -> DaySummary {
        self.day_summaries.get(&date).copied().unwrap_or_default()
    }

    /// Day buckets that fall inside the given month.
    pub fn days_in(&self, year_month: YearMonth) -> impl Iterator<Item = (&NaiveDate, &DaySummary)> {
        let start = year_month.first_day();
        let end = year_month.next().first_day();
        let end = if end > start {
            Bound::Excluded(end)
        } else {
            Bound::Unbounded
        };
        self.day_summaries.range((Bound::Included(start), end))
    }
}

pub fn aggregate(records: &[Record], reference: YearMonth) -> Aggregation {
    let mut day_summaries: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();
    let mut month_summary = MonthSummary::empty(reference);
    let mut running_balance = RunningBalance::default();
    let mut expense = RankingBuilder::new(Mode::Expense);
    let mut income = RankingBuilder::new(Mode::Income);

    for record in records {
        day_summaries
            .entry(record.occurred_on)
            .or_default()
            .add(record.mode, record.amount);
        if reference.contains(record.occurred_on) {
            month_summary.add(record.mode, record.amount);
        }
        running_balance.add(record.mode, record.amount);
        match record.mode {
            Mode::Expense => expense.add(&record.category, record.amount),
            Mode::Income => income.add(&record.category, record.amount),
        }
    }

    Aggregation {
        day_summaries,
        month_summary,
        running_balance,
        rankings: CategoryRankings {
            expense: expense.finish(),
            income: income.finish(),
        },
    }
}

pub fn day_summaries(records: &[Record]) -> BTreeMap<NaiveDate, DaySummary> {
    let mut summaries: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();
    for record in records {
        summaries
            .entry(record.occurred_on)
            .or_default()
            .add(record.mode, record.amount);
    }
    summaries
}

pub fn month_summary(records: &[Record], year_month: YearMonth) -> MonthSummary {
    records
        .iter()
        .filter(|record| year_month.contains(record.occurred_on))
        .fold(MonthSummary::empty(year_month), |mut summary, record| {
            summary.add(record.mode, record.amount);
            summary
        })
}

pub fn running_balance(records: &[Record]) -> RunningBalance {
    records
        .iter()
        .fold(RunningBalance::default(), |mut balance, record| {
            balance.add(record.mode, record.amount);
            balance
        })
}

pub fn rank_categories(records: &[Record], mode: Mode) -> CategoryRanking {
    let mut builder = RankingBuilder::new(mode);
    for record in records.iter().filter(|record| record.mode == mode) {
        builder.add(&record.category, record.amount);
    }
    builder.finish()
}

/// Records that occurred on `date`, newest first. Records without a
/// creation instant sort after those with one; remaining ties fall back
/// to descending id.
pub fn records_on(records: &[Record], date: NaiveDate) -> Vec<&Record> {
    let mut day: Vec<&Record> = records
        .iter()
        .filter(|record| record.occurred_on == date)
        .collect();
    day.sort_by(|a, b| {
        b.recorded_at
            .cmp(&a.recorded_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    day
}

struct RankingBuilder {
    mode: Mode,
    positions: HashMap<String, usize>,
    entries: Vec<CategoryTotal>,
}

impl RankingBuilder {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            positions: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn add(&mut self, category: &str, amount: u64) {
        let key = match category.trim() {
            "" => UNCATEGORIZED,
            trimmed => trimmed,
        };
        match self.positions.get(key) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                entry.total = entry.total.saturating_add(amount);
            }
            None => {
                self.positions.insert(key.to_string(), self.entries.len());
                self.entries.push(CategoryTotal {
                    category: key.to_string(),
                    total: amount,
                });
            }
        }
    }

    fn finish(mut self) -> CategoryRanking {
        // `sort_by` is stable: equal totals stay in first-seen order.
        self.entries.sort_by(|a, b| b.total.cmp(&a.total));
        CategoryRanking {
            mode: self.mode,
            entries: self.entries,
        }
    }
}
