//! Throughput Benchmark for TinyKV
//!
//! This benchmark measures the performance of the store under various
//! workloads. Every operation goes through the single store lock.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;
use tinykv::Store;

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let store = Store::new();

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.set(format!("key:{}", i), "small_value");
            i += 1;
        });
    });

    group.bench_function("set_medium", |b| {
        let mut i = 0u64;
        let value = "x".repeat(1024); // 1KB value
        b.iter(|| {
            store.set(format!("key:{}", i), value.clone());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let store = Store::new();

    // Pre-populate with data
    for i in 0..100_000 {
        store.set(format!("key:{}", i), format!("value:{}", i));
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 100_000);
            black_box(store.get(&key).ok());
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(store.get(&key).ok());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark mixed workload (80% reads, 20% writes)
fn bench_mixed(c: &mut Criterion) {
    let store = Store::new();

    // Pre-populate
    for i in 0..10_000 {
        store.set(format!("key:{}", i), format!("value:{}", i));
    }

    let mut group = c.benchmark_group("mixed");
    group.throughput(Throughput::Elements(1));

    group.bench_function("80_read_20_write", |b| {
        let mut i = 0u64;
        b.iter(|| {
            if i % 5 == 0 {
                // 20% writes
                store.set(format!("new:{}", i), "value");
            } else {
                // 80% reads
                let key = format!("key:{}", i % 10_000);
                black_box(store.get(&key).ok());
            }
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark collection operations
fn bench_collections(c: &mut Criterion) {
    let store = Store::new();

    let mut group = c.benchmark_group("collections");
    group.throughput(Throughput::Elements(1));

    group.bench_function("hset", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.hset("hash", format!("field:{}", i % 1000), "value").ok());
            i += 1;
        });
    });

    group.bench_function("lpush_rpop", |b| {
        b.iter(|| {
            let _ = store.lpush("queue", ["a", "b", "c"]);
            black_box(store.rpop("queue").ok());
        });
    });

    group.bench_function("sadd", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.sadd("set", [format!("member:{}", i % 1000)]).ok());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark concurrent access
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_mixed", |b| {
        b.iter(|| {
            let store = Arc::new(Store::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            let key = format!("key:{}:{}", t, i);
                            store.set(key.clone(), "value");
                            black_box(store.get(&key).ok());
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(store.len());
        });
    });

    group.finish();
}

/// Benchmark expiry operations
fn bench_expiry(c: &mut Criterion) {
    let store = Store::new();

    let mut group = c.benchmark_group("expiry");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_with_ttl", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.set_with_ttl(format!("key:{}", i), "value", Duration::from_secs(3600));
            i += 1;
        });
    });

    group.bench_function("expire_existing", |b| {
        // Pre-create keys
        for i in 0..10_000 {
            store.set(format!("expire:{}", i), "value");
        }

        let mut i = 0u64;
        b.iter(|| {
            let key = format!("expire:{}", i % 10_000);
            black_box(store.expire(&key, Duration::from_secs(3600)).ok());
            i += 1;
        });
    });

    group.bench_function("sweep_nothing_expired", |b| {
        b.iter(|| black_box(store.sweep_expired()));
    });

    group.finish();
}

/// Benchmark KEYS / DBSIZE scans
fn bench_keys(c: &mut Criterion) {
    let store = Store::new();

    for i in 0..1_000 {
        store.set(format!("user:{}", i), "user_data");
        store.set(format!("session:{}", i), "session_data");
        store.set(format!("cache:{}", i), "cache_data");
    }

    let mut group = c.benchmark_group("keys");

    group.bench_function("keys_all", |b| {
        b.iter(|| {
            black_box(store.keys());
        });
    });

    group.bench_function("dbsize", |b| {
        b.iter(|| {
            black_box(store.len());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_mixed,
    bench_collections,
    bench_concurrent,
    bench_expiry,
    bench_keys,
);

criterion_main!(benches);
