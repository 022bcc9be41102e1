use criterion::{criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use std::path::PathBuf;

fn bench_days(c: &mut Criterion) {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/catalog");
    let catalog = modkit::PackLoader::new(root, "empire.json")
        .load()
        .unwrap();
    let mut roster = deal_runtime::Roster::new(
        catalog,
        deal_runtime::RosterConfig {
            rng_seed: 42,
            ..Default::default()
        },
    )
    .unwrap();
    roster.initialize(None);
    let mut wallet = deal_econ::Wallet::new(Decimal::new(1_000_000_000, 0));
    c.bench_function("advance_day", |b| {
        b.iter(|| {
            let _ = roster.advance_day(&mut wallet);
            roster.drain_notices();
        })
    });
}

criterion_group!(benches, bench_days);
criterion_main!(benches);
