// ABOUTME: Benchmark suite for message sizing, page splitting and classification
// ABOUTME: Measures the per-keystroke work done while a draft is being edited

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sms_dispatch::billing::CostModel;
use sms_dispatch::codec::{byte_length, split};
use sms_dispatch::datatypes::{LMS_PAGE_MAX_BYTES, classify};
use std::time::Duration;

fn ascii_text(bytes: usize) -> String {
    "The quick brown fox jumps over the lazy dog. "
        .chars()
        .cycle()
        .take(bytes)
        .collect()
}

fn mixed_text(bytes: usize) -> String {
    // one ASCII and one wide char per three bytes
    "a가".chars().cycle().take(bytes / 3 * 2).collect()
}

fn bench_byte_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("byte_length");
    group.measurement_time(Duration::from_secs(5));

    let ascii = ascii_text(2000);
    let mixed = mixed_text(2000);

    group.bench_function("ascii_2000", |b| b.iter(|| byte_length(black_box(&ascii))));
    group.bench_function("mixed_2000", |b| b.iter(|| byte_length(black_box(&mixed))));

    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");

    for size in [2_500usize, 10_000, 50_000] {
        let text = mixed_text(size);
        group.bench_with_input(BenchmarkId::new("mixed", size), &text, |b, text| {
            b.iter(|| split(black_box(text), LMS_PAGE_MAX_BYTES))
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let model = CostModel::default();

    for size in [80usize, 1_500, 6_000] {
        let text = ascii_text(size);
        group.bench_with_input(BenchmarkId::new("classify_and_quote", size), &text, |b, text| {
            b.iter(|| {
                let classification = classify(black_box(text));
                model.quote(&classification, black_box(100))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_byte_length, bench_split, bench_classify);
criterion_main!(benches);
