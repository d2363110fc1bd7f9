#![doc(test(attr(deny(warnings))))]

//! Kakeibo Core turns a locally stored list of expense and income records
//! into the views a household ledger shows: per-day totals for a calendar
//! heat-map, month summaries, an all-time balance and category rankings.
//!
//! Stored records come in several historical layouts. [`ledger::Normalizer`]
//! repairs them into one canonical [`domain::Record`], after which
//! [`ledger::aggregate`] and [`calendar::build_month_grid`] are plain
//! functions over snapshots. [`core::RecordBook`] ties these to a
//! [`storage::KeyValueStore`].

pub mod calendar;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Kakeibo Core tracing initialized.");
    });
}
