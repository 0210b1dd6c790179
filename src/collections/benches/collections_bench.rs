//! Collection primitive benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keyward_collections::{BoundedCache, PriorityQueue};
use rand::Rng;

fn bench_cache_put_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_cache");

    for capacity in [100usize, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("put_get", capacity),
            capacity,
            |b, &capacity| {
                let cache = BoundedCache::new(capacity);
                let mut key = 0u64;
                b.iter(|| {
                    key = key.wrapping_add(1);
                    cache.put(key % (capacity as u64 * 2), key);
                    black_box(cache.get(&(key / 2)));
                });
            },
        );
    }

    group.finish();
}

fn bench_queue_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority_queue");

    for size in [1_000usize, 100_000].iter() {
        group.bench_with_input(BenchmarkId::new("push_pop_all", size), size, |b, &size| {
            let mut rng = rand::thread_rng();
            let costs: Vec<f64> = (0..size).map(|_| rng.gen()).collect();

            b.iter(|| {
                let mut queue = PriorityQueue::min();
                for (i, cost) in costs.iter().enumerate() {
                    queue.push(i, *cost);
                }
                while let Some(entry) = queue.pop() {
                    black_box(entry);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cache_put_get, bench_queue_push_pop);
criterion_main!(benches);
