//! Benchmarks for ingestion, partial results and merging
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dp_algorithms::{Algorithm, AlgorithmBuilder, BoundedSumBuilder, CountBuilder, LaplaceMechanismBuilder};

fn bench_ingestion(c: &mut Criterion) {
    let builder = BoundedSumBuilder::new()
        .with_epsilon(1.0)
        .with_lower(0.0)
        .with_upper(100.0);

    let mut group = c.benchmark_group("bounded_sum_ingestion");
    for size in [1_000usize, 10_000, 100_000] {
        let entries: Vec<f64> = (0..size).map(|i| (i % 250) as f64).collect();
        group.bench_with_input(BenchmarkId::new("add_entries", size), &entries, |b, entries| {
            b.iter(|| {
                let mut sum = builder.build().unwrap();
                sum.add_entries(black_box(entries).iter().copied());
                sum
            })
        });
    }
    group.finish();
}

fn bench_partial_results(c: &mut Criterion) {
    let builder = CountBuilder::<u64>::new()
        .with_epsilon(1.0)
        .with_mechanism(LaplaceMechanismBuilder::new().with_seed(1));

    c.bench_function("count_ten_partial_results", |b| {
        b.iter(|| {
            let mut count = builder.build().unwrap();
            count.add_entries(0..1_000);
            for _ in 0..10 {
                black_box(count.partial_result_with_budget(0.05).unwrap());
            }
        })
    });
}

fn bench_merge(c: &mut Criterion) {
    let builder = CountBuilder::<u64>::new().with_epsilon(1.0);
    let summaries: Vec<_> = (0..64)
        .map(|shard| {
            let mut count = builder.build().unwrap();
            count.add_entries(0..shard);
            count.serialize()
        })
        .collect();

    c.bench_function("count_merge_64_summaries", |b| {
        b.iter(|| {
            let mut total = builder.build().unwrap();
            for summary in &summaries {
                total.merge(black_box(summary)).unwrap();
            }
            total.raw_count()
        })
    });
}

criterion_group!(benches, bench_ingestion, bench_partial_results, bench_merge);
criterion_main!(benches);
