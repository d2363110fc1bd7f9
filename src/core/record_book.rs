use chrono::NaiveDate;

use crate::calendar::MonthView;
use crate::config::Config;
use crate::core::services::{
    CategoryService, MonthReport, RecordService, ServiceResult, SummaryService,
};
use crate::core::time::{Clock, SystemClock};
use crate::domain::{CategoryEntry, Mode, Record, RecordDraft, StoredRecord, YearMonth};
use crate::ledger::{aggregate, records_on, Aggregation, Normalizer};
use crate::storage::KeyValueStore;

/// Facade tying storage, clock and configuration to the record pipeline.
///
/// Holds no record state of its own: every read goes back to the store, so
/// an external write is picked up by the next call.
pub struct RecordBook {
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    config: Config,
}

impl RecordBook {
    pub fn new(storage: Box<dyn KeyValueStore>, config: Config) -> Self {
        Self::with_clock(storage, Box::new(SystemClock), config)
    }

    pub fn with_clock(storage: Box<dyn KeyValueStore>, clock: Box<dyn Clock>, config: Config) -> Self {
        Self {
            storage,
            clock,
            config,
        }
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today_in(self.config.offset())
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.config.offset(), self.today())
            .with_uncategorized_label(self.config.uncategorized_label.clone())
    }

    /// Raw snapshot as persisted.
    pub fn stored(&self) -> ServiceResult<Vec<StoredRecord>> {
        RecordService::load(self.storage(), &self.config.records_key)
    }

    /// Fresh, normalized view of the store.
    pub fn reload(&self) -> ServiceResult<Vec<Record>> {
        RecordService::reload(self.storage(), &self.config.records_key, &self.normalizer())
    }

    pub fn append(&self, record: StoredRecord) -> ServiceResult<Vec<Record>> {
        let snapshot = RecordService::append(self.storage(), &self.config.records_key, record)?;
        Ok(self.normalizer().normalize_all(&snapshot))
    }

    pub fn remove(&self, id: &str) -> ServiceResult<Vec<Record>> {
        let snapshot = RecordService::remove(self.storage(), &self.config.records_key, id)?;
        Ok(self.normalizer().normalize_all(&snapshot))
    }

    /// Stores a new entry and returns its persisted form.
    pub fn record(&self, draft: RecordDraft) -> ServiceResult<StoredRecord> {
        let (stored, _) = RecordService::record(
            self.storage(),
            &self.config.records_key,
            self.clock.as_ref(),
            self.config.offset(),
            draft,
        )?;
        Ok(stored)
    }

    pub fn aggregate(&self, year_month: YearMonth) -> ServiceResult<Aggregation> {
        Ok(aggregate(&self.reload()?, year_month))
    }

    pub fn summarize(&self, year_month: YearMonth) -> ServiceResult<MonthReport> {
        Ok(SummaryService::report(
            &self.reload()?,
            year_month,
            self.config.top_n,
            &self.config.other_label,
        ))
    }

    pub fn month_view(&self, year_month: YearMonth) -> ServiceResult<MonthView> {
        Ok(MonthView::build(&self.reload()?, year_month, self.today()))
    }

    pub fn day_records(&self, date: NaiveDate) -> ServiceResult<Vec<Record>> {
        let records = self.reload()?;
        Ok(records_on(&records, date).into_iter().cloned().collect())
    }

    pub fn categories(&self) -> ServiceResult<Vec<CategoryEntry>> {
        CategoryService::load(self.storage(), &self.config.categories_key)
    }

    pub fn add_category(&self, mode: Mode, name: &str) -> ServiceResult<CategoryEntry> {
        CategoryService::add(
            self.storage(),
            &self.config.categories_key,
            self.clock.as_ref(),
            mode,
            name,
        )
    }

    pub fn remove_category(&self, id: &str) -> ServiceResult<Vec<CategoryEntry>> {
        CategoryService::remove(self.storage(), &self.config.categories_key, id)
    }
}
