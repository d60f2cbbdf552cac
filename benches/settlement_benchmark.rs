use criterion::{black_box, criterion_group, criterion_main, Criterion};
use split_engine::allocation::receipt::{allocate_receipt_items, ReceiptLineItem};
use split_engine::settlement::balances::aggregate_balances;
use split_engine::settlement::reducer::{suggest_settlements, DEFAULT_TOLERANCE};
use split_engine::simulation::stress_test::{generate_random_event, EventConfig};
use rust_decimal::Decimal;

fn bench_aggregate_10_participants(c: &mut Criterion) {
    let config = EventConfig {
        participant_count: 10,
        expense_count: 100,
        ..Default::default()
    };
    let event = generate_random_event(&config);

    c.bench_function("aggregate_10_participants", |b| {
        b.iter(|| aggregate_balances(black_box(&event)))
    });
}

fn bench_aggregate_1000_participants(c: &mut Criterion) {
    let config = EventConfig {
        participant_count: 1000,
        expense_count: 5_000,
        ..Default::default()
    };
    let event = generate_random_event(&config);

    c.bench_function("aggregate_1000_participants", |b| {
        b.iter(|| aggregate_balances(black_box(&event)))
    });
}

fn bench_settle_1000_participants(c: &mut Criterion) {
    let config = EventConfig {
        participant_count: 1000,
        expense_count: 5_000,
        ..Default::default()
    };
    let event = generate_random_event(&config);
    let balances = match aggregate_balances(&event) {
        Ok(report) => report.balances,
        Err(e) => panic!("generated event failed to aggregate: {}", e),
    };

    c.bench_function("settle_1000_participants", |b| {
        b.iter(|| suggest_settlements(black_box(&balances), DEFAULT_TOLERANCE))
    });
}

fn bench_receipt_500_items(c: &mut Criterion) {
    let people = ["a", "b", "c", "d", "e"];
    let items: Vec<ReceiptLineItem> = (0..500)
        .map(|i| {
            let assigned = people.iter().take(i % people.len()).copied();
            ReceiptLineItem::new(i.to_string(), Decimal::new(i as i64 * 37 + 99, 2), assigned)
        })
        .collect();

    c.bench_function("receipt_500_items", |b| {
        b.iter(|| allocate_receipt_items(black_box(&items)))
    });
}

criterion_group!(
    benches,
    bench_aggregate_10_participants,
    bench_aggregate_1000_participants,
    bench_settle_1000_participants,
    bench_receipt_500_items
);
criterion_main!(benches);
