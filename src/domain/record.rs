use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Label used when a record carries no usable category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Field names of the persisted record layout.
pub mod fields {
    pub const ID: &str = "id";
    pub const DATE: &str = "date";
    pub const MODE: &str = "mode";
    pub const CATEGORY: &str = "category";
    /// Older schema stored the category under this name.
    pub const LEGACY_CATEGORY: &str = "store";
    pub const DISPLAY_AMOUNT: &str = "displayAmount";
    pub const ACTUAL_AMOUNT: &str = "actualAmount";
    pub const CREATED_AT: &str = "createdAt";
}

/// Discriminates the sign a record contributes to totals.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Expense,
    Income,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Expense, Mode::Income];

    /// Anything other than an explicit `"income"` is an expense.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("income") => Mode::Income,
            _ => Mode::Expense,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Expense => "expense",
            Mode::Income => "income",
        }
    }

    pub fn sign(&self) -> char {
        match self {
            Mode::Expense => '-',
            Mode::Income => '+',
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical transaction record produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: String,
    pub occurred_on: NaiveDate,
    pub mode: Mode,
    pub category: String,
    /// Recorded magnitude in yen. The sign comes from `mode`.
    pub amount: u64,
    pub recorded_at: Option<DateTime<FixedOffset>>,
}

impl Record {
    pub fn signed_amount(&self) -> i64 {
        let magnitude = i64::try_from(self.amount).unwrap_or(i64::MAX);
        match self.mode {
            Mode::Income => magnitude,
            Mode::Expense => -magnitude,
        }
    }
}

/// A record exactly as persisted. Fields are kept as raw JSON so that
/// read-modify-write cycles never drop or reshape data the normalizer
/// does not understand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredRecord(Map<String, Value>);

impl StoredRecord {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns `None` for anything that is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Identifier as a string; numeric ids from older builds are stringified.
    pub fn id(&self) -> Option<String> {
        match self.0.get(fields::ID)? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<&str> {
        self.str_field(fields::DATE)
    }

    pub fn mode(&self) -> Option<&str> {
        self.str_field(fields::MODE)
    }

    /// Current `category` field, falling back to the legacy `store` field.
    pub fn category(&self) -> Option<&str> {
        self.str_field(fields::CATEGORY)
            .or_else(|| self.str_field(fields::LEGACY_CATEGORY))
    }

    pub fn amount(&self) -> Option<&Value> {
        self.0.get(fields::ACTUAL_AMOUNT)
    }

    pub fn created_at(&self) -> Option<&str> {
        self.str_field(fields::CREATED_AT)
    }

    pub fn display_amount(&self) -> Option<&str> {
        self.str_field(fields::DISPLAY_AMOUNT)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// User input for a new record before it receives an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub occurred_on: NaiveDate,
    pub mode: Mode,
    pub category: String,
    pub amount: u64,
}

impl RecordDraft {
    pub fn new(occurred_on: NaiveDate, mode: Mode, category: impl Into<String>, amount: u64) -> Self {
        Self {
            occurred_on,
            mode,
            category: category.into(),
            amount,
        }
    }

    /// Instant stamped on the stored record: `occurred_on` at the wall-clock
    /// time of `now` in `offset`. `createdAt` outranks `date` when records are
    /// read back, so it has to fall on the chosen day.
    pub fn recorded_at(&self, now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
        let time_of_day = now.with_timezone(&offset).time();
        offset
            .from_local_datetime(&self.occurred_on.and_time(time_of_day))
            .single()
            .map_or(now, |local| local.with_timezone(&Utc))
    }

    /// Builds the persisted form in the current schema.
    pub fn into_stored(self, id: String, created_at: DateTime<Utc>) -> StoredRecord {
        let category = match self.category.trim() {
            "" => UNCATEGORIZED.to_string(),
            trimmed => trimmed.to_string(),
        };
        let mut stored = StoredRecord::default();
        stored.set(fields::ID, id);
        stored.set(fields::DATE, date_label(self.occurred_on));
        stored.set(fields::MODE, self.mode.as_str());
        stored.set(fields::CATEGORY, category);
        stored.set(
            fields::DISPLAY_AMOUNT,
            format!("{}{}円", self.mode.sign(), format_yen(self.amount)),
        );
        stored.set(fields::ACTUAL_AMOUNT, self.amount);
        stored.set(
            fields::CREATED_AT,
            created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        );
        stored
    }
}

/// `YYYY/M/D` without zero padding, the layout used by the `date` field.
pub fn date_label(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}

/// Groups digits in threes: `1234567` becomes `1,234,567`.
pub fn format_yen(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_yen_groups_thousands() {
        assert_eq!(format_yen(0), "0");
        assert_eq!(format_yen(999), "999");
        assert_eq!(format_yen(1_000), "1,000");
        assert_eq!(format_yen(1_234_567), "1,234,567");
    }

    #[test]
    fn mode_defaults_to_expense_for_unknown_values() {
        assert_eq!(Mode::from_raw(Some("income")), Mode::Income);
        assert_eq!(Mode::from_raw(Some("refund")), Mode::Expense);
        assert_eq!(Mode::from_raw(None), Mode::Expense);
    }

    #[test]
    fn category_falls_back_to_legacy_store_field() {
        let stored = StoredRecord::from_value(json!({ "id": "1", "store": "cafe" })).unwrap();
        assert_eq!(stored.category(), Some("cafe"));

        let both =
            StoredRecord::from_value(json!({ "category": "books", "store": "cafe" })).unwrap();
        assert_eq!(both.category(), Some("books"));
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let stored = StoredRecord::from_value(json!({ "id": 1700000000000u64 })).unwrap();
        assert_eq!(stored.id().as_deref(), Some("1700000000000"));
    }

    #[test]
    fn recorded_at_keeps_the_draft_date_in_the_offset() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap();
        let draft = RecordDraft::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Mode::Expense,
            "food",
            500,
        );
        let at = draft.recorded_at(now, jst);
        assert_eq!(at, Utc.with_ymd_and_hms(2024, 1, 15, 3, 0, 0).unwrap());
        assert_eq!(at.with_timezone(&jst).date_naive(), draft.occurred_on);

        // 23:30 in UTC+9.
        let late = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();
        assert_eq!(
            draft.recorded_at(late, jst).with_timezone(&jst).date_naive(),
            draft.occurred_on
        );
    }

    #[test]
    fn draft_produces_current_schema() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 5, 1, 2, 3).unwrap();
        let draft = RecordDraft::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            Mode::Expense,
            "  food ",
            1500,
        );
        let stored = draft.into_stored("abc".into(), created_at);
        assert_eq!(
            stored.into_value(),
            json!({
                "id": "abc",
                "date": "2024/3/5",
                "mode": "expense",
                "category": "food",
                "displayAmount": "-1,500円",
                "actualAmount": 1500,
                "createdAt": "2024-03-05T01:02:03.000Z"
            })
        );
    }
}
