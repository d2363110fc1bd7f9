//! Repairs persisted records into the canonical [`Record`] shape.
//!
//! Stored data comes from several generations of the entry screen: some
//! records carry a full `createdAt` instant, some only a `YYYY/M/D` string,
//! the oldest only `M/D`. The normalizer resolves a single calendar date for
//! every one of them and never rejects a record.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Mode, Record, StoredRecord, UNCATEGORIZED};

const NAIVE_INSTANT_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Which step of the resolution chain produced a record's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Timestamp,
    DateString,
    ProcessingDate,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    offset: FixedOffset,
    today: NaiveDate,
    reference_year: i32,
    uncategorized_label: String,
}

impl Normalizer {
    /// `today` is the processing date used as the last fallback; its year
    /// also completes legacy `M/D` strings unless overridden.
    pub fn new(offset: FixedOffset, today: NaiveDate) -> Self {
        Self {
            offset,
            today,
            reference_year: today.year(),
            uncategorized_label: UNCATEGORIZED.to_string(),
        }
    }

    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub fn with_uncategorized_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !label.trim().is_empty() {
            self.uncategorized_label = label.trim().to_string();
        }
        self
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn normalize(&self, raw: &StoredRecord) -> Record {
        let recorded_at = raw.created_at().and_then(|value| self.parse_instant(value));
        let (occurred_on, source) = self.resolve_date_with(raw, recorded_at);
        if source == DateSource::ProcessingDate {
            tracing::debug!(
                id = raw.id().as_deref().unwrap_or("<none>"),
                "record has no usable date; using processing date"
            );
        }
        Record {
            id: raw.id().unwrap_or_else(|| Uuid::new_v4().to_string()),
            occurred_on,
            mode: Mode::from_raw(raw.mode()),
            category: self.category_label(raw.category()),
            amount: parse_amount(raw.amount()),
            recorded_at,
        }
    }

    pub fn normalize_all(&self, raws: &[StoredRecord]) -> Vec<Record> {
        raws.iter().map(|raw| self.normalize(raw)).collect()
    }

    pub fn resolve_date(&self, raw: &StoredRecord) -> (NaiveDate, DateSource) {
        let recorded_at = raw.created_at().and_then(|value| self.parse_instant(value));
        self.resolve_date_with(raw, recorded_at)
    }

    fn resolve_date_with(
        &self,
        raw: &StoredRecord,
        recorded_at: Option<DateTime<FixedOffset>>,
    ) -> (NaiveDate, DateSource) {
        if let Some(instant) = recorded_at {
            return (instant.date_naive(), DateSource::Timestamp);
        }
        if let Some(date) = raw
            .date()
            .and_then(|value| parse_date_string(value, self.reference_year))
        {
            return (date, DateSource::DateString);
        }
        (self.today, DateSource::ProcessingDate)
    }

    /// Parses an absolute instant and expresses it in the configured offset.
    /// Instants without an explicit offset are read as local wall-clock time.
    pub fn parse_instant(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Some(instant.with_timezone(&self.offset));
        }
        NAIVE_INSTANT_FORMATS.iter().find_map(|format| {
            NaiveDateTime::parse_from_str(raw, format)
                .ok()
                .and_then(|naive| self.offset.from_local_datetime(&naive).single())
        })
    }

    fn category_label(&self, raw: Option<&str>) -> String {
        match raw.map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => self.uncategorized_label.clone(),
        }
    }
}

/// Parses `Y/M/D` (or `Y-M-D`) and the legacy `M/D` form, which takes its
/// year from `reference_year`. Zero or non-numeric components, and
/// combinations that are not a real calendar date, yield `None`.
pub fn parse_date_string(raw: &str, reference_year: i32) -> Option<NaiveDate> {
    let parts = raw
        .trim()
        .split(['/', '-'])
        .map(|part| part.trim().parse::<u32>().ok().filter(|value| *value > 0))
        .collect::<Option<Vec<u32>>>()?;
    let (year, month, day) = match parts.as_slice() {
        [year, month, day] => (i32::try_from(*year).ok()?, *month, *day),
        [month, day] => (reference_year, *month, *day),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whole-yen magnitude of a stored amount. Numbers and numeric strings are
/// accepted, fractions are truncated, negative values count by magnitude,
/// and everything else is zero.
pub fn parse_amount(raw: Option<&Value>) -> u64 {
    match raw {
        Some(Value::Number(number)) => {
            if let Some(value) = number.as_u64() {
                value
            } else if let Some(value) = number.as_i64() {
                value.unsigned_abs()
            } else {
                number.as_f64().map(float_magnitude).unwrap_or(0)
            }
        }
        Some(Value::String(text)) => {
            let text = text.trim();
            if let Ok(value) = text.parse::<u64>() {
                value
            } else if let Ok(value) = text.parse::<i64>() {
                value.unsigned_abs()
            } else {
                text.parse::<f64>().map(float_magnitude).unwrap_or(0)
            }
        }
        _ => 0,
    }
}

fn float_magnitude(value: f64) -> u64 {
    if value.is_finite() {
        // `as` saturates at the u64 bounds.
        value.abs().trunc() as u64
    } else {
        0
    }
}
