use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use osvec::{HandleHeap, OSTreeVec};

const N: usize = 10_000;

// ─── Helper functions to generate positions and values ──────────────────────

fn random_values(n: usize) -> Vec<u64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut values = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        values.push(x >> 33);
    }
    values
}

/// Position for the `i`-th insertion into a sequence that already holds `i`
/// elements.
fn insert_positions(n: usize) -> Vec<usize> {
    random_values(n)
        .into_iter()
        .enumerate()
        .map(|(i, x)| (x as usize) % (i + 1))
        .collect()
}

// ─── Sequence Benchmarks ────────────────────────────────────────────────────

fn bench_seq_insert_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("seq_insert_random");
    let positions = insert_positions(N);

    group.bench_function(BenchmarkId::new("OSTreeVec", N), |b| {
        b.iter(|| {
            let mut seq = OSTreeVec::new();
            for (i, &pos) in positions.iter().enumerate() {
                seq.insert(pos, i).unwrap();
            }
            seq
        });
    });

    group.bench_function(BenchmarkId::new("Vec", N), |b| {
        b.iter(|| {
            let mut vec = Vec::new();
            for (i, &pos) in positions.iter().enumerate() {
                vec.insert(pos, i);
            }
            vec
        });
    });

    group.finish();
}

fn bench_seq_push_front(c: &mut Criterion) {
    let mut group = c.benchmark_group("seq_push_front");

    group.bench_function(BenchmarkId::new("OSTreeVec", N), |b| {
        b.iter(|| {
            let mut seq = OSTreeVec::new();
            for i in 0..N {
                seq.push_front(i);
            }
            seq
        });
    });

    group.bench_function(BenchmarkId::new("Vec", N), |b| {
        b.iter(|| {
            let mut vec = Vec::new();
            for i in 0..N {
                vec.insert(0, i);
            }
            vec
        });
    });

    group.finish();
}

fn bench_seq_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("seq_at");
    let seq: OSTreeVec<usize> = (0..N).collect();
    let probes: Vec<usize> = random_values(N).into_iter().map(|x| x as usize % N).collect();

    group.bench_function(BenchmarkId::new("OSTreeVec", N), |b| {
        b.iter(|| probes.iter().map(|&i| seq[i]).sum::<usize>());
    });

    group.bench_function(BenchmarkId::new("OSTreeVec::iter", N), |b| {
        b.iter(|| seq.iter().sum::<usize>());
    });

    group.finish();
}

fn bench_seq_erase_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("seq_erase_random");
    let positions: Vec<usize> = insert_positions(N).into_iter().rev().collect();

    group.bench_function(BenchmarkId::new("OSTreeVec", N), |b| {
        b.iter_batched(
            || (0..N).collect::<OSTreeVec<usize>>(),
            |mut seq| {
                for (remaining, &pos) in (1..=N).rev().zip(&positions) {
                    seq.erase(pos % remaining).unwrap();
                }
                seq
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.bench_function(BenchmarkId::new("Vec", N), |b| {
        b.iter_batched(
            || (0..N).collect::<Vec<usize>>(),
            |mut vec| {
                for (remaining, &pos) in (1..=N).rev().zip(&positions) {
                    vec.remove(pos % remaining);
                }
                vec
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

// ─── Heap Benchmarks ────────────────────────────────────────────────────────

fn bench_heap_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap_push_pop");
    let values = random_values(N);

    group.bench_function(BenchmarkId::new("HandleHeap", N), |b| {
        b.iter(|| {
            let mut heap = HandleHeap::new();
            for &v in &values {
                heap.push(v);
            }
            let mut sum = 0u64;
            while let Some(v) = heap.pop() {
                sum = sum.wrapping_add(v);
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BinaryHeap", N), |b| {
        b.iter(|| {
            let mut heap = BinaryHeap::new();
            for &v in &values {
                heap.push(Reverse(v));
            }
            let mut sum = 0u64;
            while let Some(Reverse(v)) = heap.pop() {
                sum = sum.wrapping_add(v);
            }
            sum
        });
    });

    group.finish();
}

fn bench_heap_decrease_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap_decrease_key");
    let values = random_values(N);

    group.bench_function(BenchmarkId::new("HandleHeap", N), |b| {
        b.iter(|| {
            let mut heap = HandleHeap::new();
            let handles: Vec<_> = values.iter().map(|&v| heap.push(v)).collect();
            for h in handles {
                heap.change(h, |v| *v /= 2).unwrap();
            }
            heap
        });
    });

    group.finish();
}

criterion_group!(
    sequence_benches,
    bench_seq_insert_random,
    bench_seq_push_front,
    bench_seq_at,
    bench_seq_erase_random,
);

criterion_group!(heap_benches, bench_heap_push_pop, bench_heap_decrease_key);

criterion_main!(sequence_benches, heap_benches);
