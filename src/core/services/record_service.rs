use chrono::FixedOffset;
use serde_json::Value;
use uuid::Uuid;

use crate::core::time::Clock;
use crate::domain::{Record, RecordDraft, StoredRecord};
use crate::ledger::Normalizer;
use crate::storage::KeyValueStore;

use super::{ServiceError, ServiceResult};

/// Read-modify-write access to the persisted record collection.
///
/// Every mutation loads the whole array, applies the change to the snapshot
/// and writes the whole array back. Nothing is cached between calls.
pub struct RecordService;

impl RecordService {
    /// Parses a stored blob. Anything that is not a JSON array yields an empty
    /// collection; array elements that are not objects are dropped.
    pub fn decode(blob: &str) -> Vec<StoredRecord> {
        let items = match serde_json::from_str::<Value>(blob) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                tracing::warn!(kind = json_kind(&other), "record blob is not an array; ignoring");
                return Vec::new();
            }
            Err(err) => {
                tracing::warn!(%err, "record blob is not valid JSON; ignoring");
                return Vec::new();
            }
        };
        let total = items.len();
        let records: Vec<StoredRecord> = items
            .into_iter()
            .filter_map(StoredRecord::from_value)
            .collect();
        if records.len() != total {
            tracing::warn!(
                skipped = total - records.len(),
                "dropped non-object entries from record blob"
            );
        }
        records
    }

    pub fn encode(records: &[StoredRecord]) -> ServiceResult<String> {
        serde_json::to_string(records).map_err(|err| ServiceError::Storage(err.into()))
    }

    /// Current snapshot under `key`; a missing key is an empty collection.
    pub fn load(store: &dyn KeyValueStore, key: &str) -> ServiceResult<Vec<StoredRecord>> {
        let records = match store.get(key)? {
            Some(blob) => Self::decode(&blob),
            None => Vec::new(),
        };
        tracing::debug!(key, count = records.len(), "loaded records");
        Ok(records)
    }

    /// Loads and normalizes in one step. Call again after any external change
    /// to the store; results are never cached.
    pub fn reload(
        store: &dyn KeyValueStore,
        key: &str,
        normalizer: &Normalizer,
    ) -> ServiceResult<Vec<Record>> {
        let stored = Self::load(store, key)?;
        Ok(normalizer.normalize_all(&stored))
    }

    /// New snapshot with `record` placed first, the way the entry screen
    /// shows the latest entry on top. Existing records are untouched.
    pub fn with_appended(snapshot: &[StoredRecord], record: StoredRecord) -> Vec<StoredRecord> {
        let mut next = Vec::with_capacity(snapshot.len() + 1);
        next.push(record);
        next.extend_from_slice(snapshot);
        next
    }

    /// Snapshot without any record whose id equals `id`, plus whether
    /// anything was removed.
    pub fn without(snapshot: &[StoredRecord], id: &str) -> (Vec<StoredRecord>, bool) {
        let next: Vec<StoredRecord> = snapshot
            .iter()
            .filter(|record| record.id().as_deref() != Some(id))
            .cloned()
            .collect();
        let removed = next.len() != snapshot.len();
        (next, removed)
    }

    pub fn append(
        store: &dyn KeyValueStore,
        key: &str,
        record: StoredRecord,
    ) -> ServiceResult<Vec<StoredRecord>> {
        let current = Self::load(store, key)?;
        let next = Self::with_appended(&current, record);
        store.set(key, &Self::encode(&next)?)?;
        tracing::debug!(key, count = next.len(), "appended record");
        Ok(next)
    }

    /// Removing an id that is not present returns the unchanged snapshot
    /// without writing.
    pub fn remove(
        store: &dyn KeyValueStore,
        key: &str,
        id: &str,
    ) -> ServiceResult<Vec<StoredRecord>> {
        let current = Self::load(store, key)?;
        let (next, removed) = Self::without(&current, id);
        if !removed {
            tracing::debug!(key, id, "remove requested for unknown id");
            return Ok(current);
        }
        store.set(key, &Self::encode(&next)?)?;
        tracing::debug!(key, id, count = next.len(), "removed record");
        Ok(next)
    }

    /// Turns a validated draft into a stored record and appends it. `offset`
    /// is the one records are read back in, so the stored `createdAt` lands
    /// on the draft's date.
    pub fn record(
        store: &dyn KeyValueStore,
        key: &str,
        clock: &dyn Clock,
        offset: FixedOffset,
        draft: RecordDraft,
    ) -> ServiceResult<(StoredRecord, Vec<StoredRecord>)> {
        if draft.amount == 0 {
            return Err(ServiceError::Invalid("Amount must be greater than zero".into()));
        }
        let recorded_at = draft.recorded_at(clock.now(), offset);
        let stored = draft.into_stored(Self::new_id(clock), recorded_at);
        let snapshot = Self::append(store, key, stored.clone())?;
        Ok((stored, snapshot))
    }

    /// `<unix-millis>-<8 hex digits>`.
    pub fn new_id(clock: &dyn Clock) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", clock.now().timestamp_millis(), &suffix[..8])
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::domain::Mode;
    use crate::storage::MemoryStore;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    const KEY: &str = "records";

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn stored(value: Value) -> StoredRecord {
        StoredRecord::from_value(value).unwrap()
    }

    #[test]
    fn decode_tolerates_garbage() {
        assert!(RecordService::decode("not json").is_empty());
        assert!(RecordService::decode(r#"{"id":"1"}"#).is_empty());
        let records = RecordService::decode(r#"[{"id":"1"}, 5, "x", {"id":"2"}]"#);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id().as_deref(), Some("2"));
    }

    #[test]
    fn append_prepends_and_persists() {
        let store = MemoryStore::new();
        RecordService::append(&store, KEY, stored(json!({"id": "a"}))).unwrap();
        let snapshot = RecordService::append(&store, KEY, stored(json!({"id": "b"}))).unwrap();
        let ids: Vec<_> = snapshot.iter().filter_map(StoredRecord::id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(RecordService::load(&store, KEY).unwrap(), snapshot);
    }

    #[test]
    fn remove_unknown_id_skips_write() {
        let store = MemoryStore::new();
        RecordService::append(&store, KEY, stored(json!({"id": "a"}))).unwrap();
        let writes = store.write_count();
        let snapshot = RecordService::remove(&store, KEY, "missing").unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn remove_matches_numeric_ids() {
        let store = MemoryStore::new().with_entry(KEY, r#"[{"id": 17}, {"id": "18"}]"#);
        let snapshot = RecordService::remove(&store, KEY, "17").unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id().as_deref(), Some("18"));
    }

    #[test]
    fn unknown_fields_survive_a_write() {
        let store = MemoryStore::new().with_entry(KEY, r#"[{"id":"a","memo":"keep me"}]"#);
        let snapshot = RecordService::append(&store, KEY, stored(json!({"id": "b"}))).unwrap();
        assert_eq!(snapshot[1].as_map().get("memo"), Some(&json!("keep me")));
    }

    #[test]
    fn zero_amount_drafts_are_rejected() {
        let store = MemoryStore::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap());
        let draft = RecordDraft::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            Mode::Expense,
            "cafe",
            0,
        );
        let err = RecordService::record(&store, KEY, &clock, jst(), draft).expect_err("zero amount");
        assert!(matches!(err, ServiceError::Invalid(_)));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn drafts_receive_timestamped_ids() {
        let store = MemoryStore::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap());
        let draft = RecordDraft::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            Mode::Income,
            "salary",
            1500,
        );
        let (stored, snapshot) = RecordService::record(&store, KEY, &clock, jst(), draft).unwrap();
        let id = stored.id().unwrap();
        let (millis, hex) = id.split_once('-').unwrap();
        assert_eq!(millis, clock.now().timestamp_millis().to_string());
        assert_eq!(hex.len(), 8);
        assert_eq!(stored.display_amount(), Some("+1,500円"));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn backdated_drafts_normalize_to_their_own_date() {
        let store = MemoryStore::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap());
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let draft = RecordDraft::new(day, Mode::Expense, "food", 500);
        let (stored, _) = RecordService::record(&store, KEY, &clock, jst(), draft).unwrap();
        assert_eq!(stored.date(), Some("2024/1/15"));
        assert_eq!(stored.created_at(), Some("2024-01-15T03:00:00.000Z"));

        let normalizer = Normalizer::new(jst(), clock.today_in(jst()));
        let records = RecordService::reload(&store, KEY, &normalizer).unwrap();
        assert_eq!(records[0].occurred_on, day);
    }
}
