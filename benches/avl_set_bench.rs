//! Benchmark for `PersistentAvlSet` vs the standard `BTreeSet`.
//!
//! Also compares batched insertion (one copy-on-write context for the whole
//! fill) against per-operation persistent insertion (a fresh fork per
//! element), which is where the path-copy amortization shows up.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use arbors::PersistentAvlSet;
use std::collections::BTreeSet;

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for size in [100, 1000, 10000] {
        // One batch: every element shares the same copy-on-write context.
        group.bench_with_input(
            BenchmarkId::new("PersistentAvlSet/batched", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let set =
                        PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, 0..black_box(size));
                    black_box(set)
                });
            },
        );

        // One fork per element: the path is re-copied for every insert.
        group.bench_with_input(
            BenchmarkId::new("PersistentAvlSet/per_op", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut set = PersistentAvlSet::new(|a: &i32, b: &i32| a < b);
                    for index in 0..size {
                        set = set.insert(black_box(index));
                    }
                    black_box(set)
                });
            },
        );

        // Standard BTreeSet insert.
        group.bench_with_input(
            BenchmarkId::new("BTreeSet", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut set = BTreeSet::new();
                    for index in 0..size {
                        set.insert(black_box(index));
                    }
                    black_box(set)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// lookup Benchmark
// =============================================================================

fn benchmark_lookup(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("lookup");

    for size in [100, 1000, 10000] {
        let persistent = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, 0..size);
        let standard: BTreeSet<i32> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentAvlSet", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    for index in 0..size {
                        black_box(persistent.fetch(&black_box(index)));
                    }
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &size, |bencher, &size| {
            bencher.iter(|| {
                for index in 0..size {
                    black_box(standard.contains(&black_box(index)));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// walk Benchmark
// =============================================================================

fn benchmark_walk(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("walk");

    for size in [1000, 10000] {
        let persistent = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, 0..size);
        let standard: BTreeSet<i32> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentAvlSet", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let mut sum = 0_i64;
                    persistent.walk(|item| {
                        sum += i64::from(*item);
                        true
                    });
                    black_box(sum)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &size, |bencher, _| {
            bencher.iter(|| {
                let sum: i64 = standard.iter().map(|item| i64::from(*item)).sum();
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// delete Benchmark
// =============================================================================

fn benchmark_delete(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("delete");

    for size in [100, 1000] {
        let persistent = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, 0..size);

        group.bench_with_input(
            BenchmarkId::new("PersistentAvlSet/batched", size),
            &size,
            |bencher, &size| {
                let everything: Vec<i32> = (0..size).collect();
                bencher.iter(|| {
                    let (emptied, deleted) = persistent.delete_items(&everything);
                    black_box((emptied, deleted))
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("PersistentAvlSet/per_op", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut set = persistent.fork();
                    for index in 0..size {
                        let (next, _) = set.delete(&black_box(index));
                        set = next;
                    }
                    black_box(set)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_lookup,
    benchmark_walk,
    benchmark_delete
);
criterion_main!(benches);
