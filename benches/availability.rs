//! 可用性计数基准测试
//!
//! 测试计数器累加和快照渲染的开销

use criterion::{criterion_group, criterion_main, Criterion};
use domain_availability::health::{domain_of, AvailabilityTally};
use std::hint::black_box;

fn sample_urls() -> Vec<String> {
    (0..50)
        .map(|i| format!("https://service-{}.example.com/health/{}", i % 10, i))
        .collect()
}

/// 计数器累加基准测试
fn tally_record_benchmark(c: &mut Criterion) {
    let urls = sample_urls();

    c.bench_function("domain_extraction", |b| {
        b.iter(|| {
            for url in &urls {
                black_box(domain_of(black_box(url)));
            }
        });
    });

    c.bench_function("tally_record_round", |b| {
        let mut tally = AvailabilityTally::new();
        b.iter(|| {
            for (i, url) in urls.iter().enumerate() {
                tally.record(url, i % 3 != 0);
            }
        });
        black_box(tally);
    });
}

/// 快照渲染基准测试
fn snapshot_render_benchmark(c: &mut Criterion) {
    let mut tally = AvailabilityTally::new();
    for (i, url) in sample_urls().iter().enumerate() {
        tally.record(url, i % 4 != 0);
    }

    c.bench_function("snapshot_render", |b| {
        b.iter(|| black_box(tally.snapshot().render_lines()));
    });
}

criterion_group!(benches, tally_record_benchmark, snapshot_render_benchmark);
criterion_main!(benches);
