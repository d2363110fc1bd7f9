#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use kakeibo_core::{
    config::Config,
    core::{time::FixedClock, RecordBook},
    storage::{JsonFileStore, MemoryStore},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// 2024-03-10 12:00 in UTC+9.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap()
}

pub fn jst_config() -> Config {
    Config::default().with_offset_minutes(9 * 60)
}

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Book over an in-memory store the test can still inspect.
pub fn memory_book() -> (RecordBook, Arc<MemoryStore>) {
    memory_book_with(MemoryStore::new())
}

pub fn memory_book_with(store: MemoryStore) -> (RecordBook, Arc<MemoryStore>) {
    let store = Arc::new(store);
    let book = RecordBook::with_clock(
        Box::new(Arc::clone(&store)),
        Box::new(FixedClock(fixed_now())),
        jst_config(),
    );
    (book, store)
}

/// Book over a file store in a fresh directory.
pub fn file_book() -> (RecordBook, JsonFileStore, PathBuf) {
    let base = temp_base();
    let store = JsonFileStore::new(Some(base.clone()), Some(3)).expect("create json file store");
    let book = RecordBook::with_clock(
        Box::new(store.clone()),
        Box::new(FixedClock(fixed_now())),
        jst_config(),
    );
    (book, store, base)
}
