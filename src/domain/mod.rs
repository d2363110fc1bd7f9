//! Record models and the derived summary shapes produced by aggregation.
//! No I/O lives here; only data types, their invariants, and small helpers.

pub mod category;
pub mod record;
pub mod summary;
pub mod year_month;

pub use category::CategoryEntry;
pub use record::{fields, Mode, Record, RecordDraft, StoredRecord, UNCATEGORIZED};
pub use summary::{
    CategoryRanking, CategoryRankings, CategoryTotal, DaySummary, MonthSummary, RunningBalance,
    OTHER_CATEGORY,
};
pub use year_month::YearMonth;
