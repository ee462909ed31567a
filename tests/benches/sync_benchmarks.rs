//! # Raffle Sync Benchmarks
//!
//! | Path | Runs | Target |
//! |------|------|--------|
//! | `compute_snapshot` | every clock tick | < 1µs |
//! | `aggregate` | every fetch cycle | < 1ms for 10k entries |
//! | `aggregate_payload` | every fetch cycle, with validation | < 5ms for 10k entries |

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use raffle_sync::{
    compute_snapshot, rank_by_tickets, EntryAggregator, EntryRecord, EpochWindow,
    ParticipantsPayload,
};

fn entries(count: usize) -> Vec<EntryRecord> {
    let start = Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            EntryRecord::new(
                format!("addr1q{:0>50}", i),
                start + Duration::seconds(i as i64 * 37),
                (i % 40) as f64 * 5.0,
                (i % 7) as f64 * 1_000.0,
                (i % 40) as u64,
            )
        })
        .collect()
}

// ============================================================================
// Epoch clock
// ============================================================================

fn bench_compute_snapshot(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap();
    let window = EpochWindow::fixed_cycle(start, Duration::days(5)).unwrap();

    let mut group = c.benchmark_group("epoch-clock");
    for (label, now) in [
        ("before_start", start - Duration::hours(1)),
        ("in_window", start + Duration::hours(30)),
        ("after_end", start + Duration::days(6)),
    ] {
        group.bench_with_input(BenchmarkId::new("compute_snapshot", label), &now, |b, now| {
            b.iter(|| black_box(compute_snapshot(&window, 535, black_box(*now))))
        });
    }
    group.finish();
}

// ============================================================================
// Entry aggregation
// ============================================================================

fn bench_aggregate(c: &mut Criterion) {
    let aggregator = EntryAggregator::utc();

    let mut group = c.benchmark_group("entry-aggregator");
    for size in [100usize, 1_000, 10_000] {
        let records = entries(size);
        let payload = ParticipantsPayload::from_records(&records);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("aggregate", size), &records, |b, records| {
            b.iter(|| black_box(aggregator.aggregate(records)))
        });
        group.bench_with_input(
            BenchmarkId::new("aggregate_payload", size),
            &payload,
            |b, payload| b.iter(|| black_box(aggregator.aggregate_payload(payload))),
        );
        group.bench_with_input(BenchmarkId::new("rank_by_tickets", size), &records, |b, records| {
            b.iter(|| {
                let mut ranked = records.clone();
                rank_by_tickets(&mut ranked);
                black_box(ranked)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compute_snapshot, bench_aggregate);
criterion_main!(benches);
