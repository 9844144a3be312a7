use common::{Money, ProductId};
use criterion::{Criterion, criterion_group, criterion_main};
use ledger::{Product, StockLedger, StockLine};

fn seeded_ledger(rt: &tokio::runtime::Runtime, skus: usize, stock: i64) -> StockLedger {
    let ledger = StockLedger::new();
    rt.block_on(async {
        for i in 0..skus {
            ledger
                .upsert_product(Product::new(
                    format!("SKU-{i:04}"),
                    "Widget",
                    Money::from_cents(1000),
                    stock,
                ))
                .await
                .unwrap();
        }
    });
    ledger
}

fn bench_reserve_single(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let ledger = seeded_ledger(&rt, 1, i64::MAX / 2);
    let id = ProductId::new("SKU-0000");

    c.bench_function("ledger/reserve_single", |b| {
        b.iter(|| {
            rt.block_on(async {
                ledger.reserve(&id, 1).await.unwrap();
            });
        });
    });
}

fn bench_reserve_restore_pair(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let ledger = seeded_ledger(&rt, 1, 100);
    let id = ProductId::new("SKU-0000");

    c.bench_function("ledger/reserve_restore_pair", |b| {
        b.iter(|| {
            rt.block_on(async {
                ledger.reserve(&id, 1).await.unwrap();
                ledger.restore(&id, 1).await.unwrap();
            });
        });
    });
}

fn bench_reserve_all_10_lines(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let ledger = seeded_ledger(&rt, 10, i64::MAX / 2);
    let lines: Vec<StockLine> = (0..10)
        .map(|i| StockLine::new(format!("SKU-{i:04}"), 1))
        .collect();

    c.bench_function("ledger/reserve_all_10_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                ledger.reserve_all(&lines).await.unwrap();
            });
        });
    });
}

fn bench_catalog_lookup(c: &mut Criterion) {
    use ledger::Catalog;

    let rt = tokio::runtime::Runtime::new().unwrap();
    let ledger = seeded_ledger(&rt, 100, 10);
    let id = ProductId::new("SKU-0050");

    c.bench_function("ledger/catalog_lookup", |b| {
        b.iter(|| {
            rt.block_on(async {
                ledger.product(&id).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_reserve_single,
    bench_reserve_restore_pair,
    bench_reserve_all_10_lines,
    bench_catalog_lookup,
);
criterion_main!(benches);
