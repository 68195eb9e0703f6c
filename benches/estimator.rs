use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ouflow_rs::engine::estimator::OuEstimator;
use ouflow_rs::engine::window::RollingWindow;
use ouflow_rs::engine::BookSide;

fn full_window(window: usize) -> RollingWindow {
    let mut w = RollingWindow::new(window);
    for i in 0..=window as i64 {
        w.push(3_000_000_000 + (i * 7_919) % 50_000_000);
    }
    w
}

fn bench_fit(c: &mut Criterion) {
    let estimator = OuEstimator::new(0.1);
    let w = full_window(300);
    c.bench_function("ou_fit_300", |b| {
        b.iter(|| estimator.fit(BookSide::Bid, black_box(&w)))
    });
}

fn bench_estimate_and_refill(c: &mut Criterion) {
    let estimator = OuEstimator::new(0.1);
    let mut bids = full_window(300);
    let mut asks = full_window(300);
    let mut next = 3_000_000_000i64;
    c.bench_function("ou_estimate_pair_refill_300", |b| {
        b.iter(|| {
            let e = estimator.estimate_pair(&mut bids, &mut asks);
            next += 12_345;
            bids.push(next);
            asks.push(next + 7);
            black_box(e)
        })
    });
}

criterion_group!(benches, bench_fit, bench_estimate_and_refill);
criterion_main!(benches);
