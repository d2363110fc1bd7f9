use chrono::{Duration, FixedOffset, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kakeibo_core::calendar::MonthView;
use kakeibo_core::core::services::RecordService;
use kakeibo_core::domain::{StoredRecord, YearMonth};
use kakeibo_core::ledger::{aggregate, Normalizer};
use serde_json::json;

const CATEGORIES: [&str; 8] = [
    "food", "cafe", "rent", "transport", "books", "gifts", "utilities", "misc",
];

fn build_sample_records(count: usize) -> Vec<StoredRecord> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..count)
        .filter_map(|idx| {
            let day = start + Duration::days((idx % 730) as i64);
            let value = match idx % 3 {
                0 => json!({
                    "id": idx.to_string(),
                    "mode": "expense",
                    "date": kakeibo_core::domain::record::date_label(day),
                    "category": CATEGORIES[idx % CATEGORIES.len()],
                    "actualAmount": 100 + (idx % 900),
                }),
                1 => json!({
                    "id": idx.to_string(),
                    "mode": "income",
                    "createdAt": format!("{}T09:30:00.000Z", day.format("%Y-%m-%d")),
                    "category": "salary",
                    "actualAmount": (5000 + idx % 100).to_string(),
                }),
                _ => json!({
                    "id": idx,
                    "date": format!("{}/{}", day.format("%-m"), day.format("%-d")),
                    "store": CATEGORIES[(idx / 3) % CATEGORIES.len()],
                    "actualAmount": 42.5,
                }),
            };
            StoredRecord::from_value(value)
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let stored = build_sample_records(black_box(10_000));
    let blob = RecordService::encode(&stored).expect("encode");
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let normalizer = Normalizer::new(FixedOffset::east_opt(9 * 3600).unwrap(), today);
    let records = normalizer.normalize_all(&stored);
    let month = YearMonth::new(2024, 3).unwrap();

    c.bench_function("decode_10k", |b| {
        b.iter(|| black_box(RecordService::decode(&blob)))
    });

    c.bench_function("normalize_10k", |b| {
        b.iter(|| black_box(normalizer.normalize_all(&stored)))
    });

    c.bench_function("aggregate_10k", |b| {
        b.iter(|| black_box(aggregate(&records, month)))
    });

    c.bench_function("month_view_10k", |b| {
        b.iter(|| black_box(MonthView::build(&records, month, today)))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
