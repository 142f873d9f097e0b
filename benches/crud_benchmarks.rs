use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use keylist::{KeyedMap, NativeEndian, OrderedList, WideStr};
use std::collections::BTreeMap;
use std::hint::black_box;

const N: usize = 10_000;

// ─── Key sequences ───────────────────────────────────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Deterministic LCG so runs are comparable.
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn build_keyed(keys: &[i64]) -> KeyedMap<NativeEndian<i64>> {
    let mut map = KeyedMap::with_capacity(8, NativeEndian::new(), keys.len());
    for &k in keys {
        map.insert(&k.to_ne_bytes(), &k.to_ne_bytes()).unwrap();
    }
    map
}

fn build_btree(keys: &[i64]) -> BTreeMap<i64, i64> {
    keys.iter().map(|&k| (k, k)).collect()
}

// ─── Map benchmarks ──────────────────────────────────────────────────────────

fn bench_map_insert(c: &mut Criterion) {
    for (order, keys) in [
        ("ordered", ordered_keys(N)),
        ("reverse", reverse_ordered_keys(N)),
        ("random", random_keys(N)),
    ] {
        let mut group = c.benchmark_group(format!("map_insert_{order}"));
        group.bench_function(BenchmarkId::new("KeyedMap", N), |b| b.iter(|| build_keyed(black_box(&keys))));
        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| b.iter(|| build_btree(black_box(&keys))));
        group.finish();
    }
}

fn bench_map_get(c: &mut Criterion) {
    for (order, keys) in [
        ("ordered", ordered_keys(N)),
        ("reverse", reverse_ordered_keys(N)),
        ("random", random_keys(N)),
    ] {
        let keyed = build_keyed(&keys);
        let btree = build_btree(&keys);

        let mut group = c.benchmark_group(format!("map_get_{order}"));
        group.bench_function(BenchmarkId::new("KeyedMap", N), |b| {
            b.iter(|| {
                for &k in &keys {
                    black_box(keyed.get(&k.to_ne_bytes()).unwrap());
                }
            });
        });
        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                for k in &keys {
                    black_box(btree.get(k));
                }
            });
        });
        group.finish();
    }
}

fn bench_map_clear(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_clear");
    group.bench_function(BenchmarkId::new("KeyedMap", N), |b| {
        b.iter_batched(
            || build_keyed(&keys),
            |mut map| {
                map.clear();
                map
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

// ─── List benchmarks ─────────────────────────────────────────────────────────

fn bench_list_sort(c: &mut Criterion) {
    let keys = random_keys(N);
    let names: Vec<Vec<u8>> = keys.iter().map(|k| WideStr::encode(&format!("IMG_{k:010}.jpg"))).collect();

    let mut group = c.benchmark_group("list_sort_random");
    group.bench_function(BenchmarkId::new("NativeEndian<i64>", N), |b| {
        b.iter_batched(
            || {
                let mut list = OrderedList::with_capacity(N, Some(NativeEndian::<i64>::new()));
                for k in &keys {
                    list.push_front(&k.to_ne_bytes()).unwrap();
                }
                list
            },
            |mut list| {
                list.sort().unwrap();
                list
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function(BenchmarkId::new("WideStr", N), |b| {
        b.iter_batched(
            || {
                let mut list = OrderedList::with_capacity(N, Some(WideStr));
                for name in &names {
                    list.push_front(name).unwrap();
                }
                list
            },
            |mut list| {
                list.sort().unwrap();
                list
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

// ─── Criterion groups ────────────────────────────────────────────────────────

criterion_group!(map_benches, bench_map_insert, bench_map_get, bench_map_clear);

criterion_group!(list_benches, bench_list_sort);

criterion_main!(map_benches, list_benches);
