//! Benchmark for BTree vs standard BTreeSet.
//!
//! Compares canopy's BTree at several orders against
//! `std::collections::BTreeSet` for inserts, lookups and removals.

use canopy::mutable::{BTree, NaturalOrder};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeSet;
use std::hint::black_box;

/// Deterministic scrambled key sequence.
fn scrambled_keys(size: u64) -> Vec<u64> {
    (0..size)
        .map(|index| index.wrapping_mul(0x9E37_79B9_7F4A_7C15) % (size * 4))
        .collect()
}

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("btree_insert");

    for size in [1000_u64, 100_000] {
        let keys = scrambled_keys(size);

        group.bench_with_input(BenchmarkId::new("BTree<8>", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut tree: BTree<u64> = BTree::new();
                for key in keys {
                    tree.insert(black_box(*key));
                }
                black_box(tree)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTree<32>", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut tree: BTree<u64, NaturalOrder, 32> = BTree::default();
                for key in keys {
                    tree.insert(black_box(*key));
                }
                black_box(tree)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut set = BTreeSet::new();
                for key in keys {
                    set.insert(black_box(*key));
                }
                black_box(set)
            });
        });
    }

    group.finish();
}

// =============================================================================
// contains Benchmark
// =============================================================================

fn benchmark_contains(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("btree_contains");

    for size in [1000_u64, 100_000] {
        let keys = scrambled_keys(size);
        let tree: BTree<u64> = keys.iter().copied().collect();
        let set: BTreeSet<u64> = keys.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("BTree<8>", size), &size, |bencher, &size| {
            bencher.iter(|| {
                (0..size)
                    .filter(|key| tree.contains(black_box(key)))
                    .count()
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &size, |bencher, &size| {
            bencher.iter(|| {
                (0..size)
                    .filter(|key| set.contains(black_box(key)))
                    .count()
            });
        });
    }

    group.finish();
}

// =============================================================================
// remove Benchmark
// =============================================================================

fn benchmark_remove(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("btree_remove");

    for size in [1000_u64, 100_000] {
        let keys = scrambled_keys(size);
        let tree: BTree<u64> = keys.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("BTree<8>", size), &keys, |bencher, keys| {
            bencher.iter_batched(
                || tree.clone(),
                |mut tree| {
                    for key in keys {
                        tree.remove(black_box(key));
                    }
                    black_box(tree)
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_contains,
    benchmark_remove
);
criterion_main!(benches);
