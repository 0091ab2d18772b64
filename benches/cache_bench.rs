// ABOUTME: Criterion benchmarks for the local cache comparing SQLite and in-memory backends
// ABOUTME: Measures set/get latency by payload size and user-scoped invalidation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for cache operations.
//!
//! Both backends run behind the same `Cache` facade, so the numbers show
//! what an offline read or write costs on each.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pierre_coach::cache::{Cache, CacheKey};
use pierre_coach::database::LocalDatabase;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Test payload sizes for benchmarking
#[derive(Debug, Clone, Copy)]
enum PayloadSize {
    Small,
    Medium,
    Large,
}

impl PayloadSize {
    const fn bytes(self) -> usize {
        match self {
            Self::Small => 100,
            Self::Medium => 1_000,
            Self::Large => 10_000,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Small => "100B",
            Self::Medium => "1KB",
            Self::Large => "10KB",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TestPayload {
    data: String,
    count: usize,
}

fn generate_payload(size: PayloadSize) -> TestPayload {
    let target_size = size.bytes();
    TestPayload {
        data: "x".repeat(target_size.saturating_sub(50)),
        count: target_size,
    }
}

fn backends(rt: &Runtime) -> Vec<(&'static str, Cache)> {
    let database = rt
        .block_on(LocalDatabase::new("sqlite::memory:"))
        .unwrap();
    vec![
        ("sqlite", Cache::sqlite(&database)),
        ("memory", Cache::memory(10_000)),
    ]
}

fn bench_cache_set(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cache_set");

    for (backend, cache) in backends(&rt) {
        for size in [PayloadSize::Small, PayloadSize::Medium, PayloadSize::Large] {
            let payload = generate_payload(size);
            let key = CacheKey::TodaySteps {
                user_id: Uuid::from_u128(1),
            };
            group.throughput(Throughput::Bytes(size.bytes() as u64));
            group.bench_with_input(
                BenchmarkId::new(backend, size.name()),
                &payload,
                |b, payload| {
                    b.to_async(&rt)
                        .iter(|| async { cache.set(&key, black_box(payload)).await.unwrap() });
                },
            );
        }
    }
    group.finish();
}

fn bench_cache_get(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cache_get");

    for (backend, cache) in backends(&rt) {
        for size in [PayloadSize::Small, PayloadSize::Medium, PayloadSize::Large] {
            let key = CacheKey::WorkoutProgram {
                user_id: Uuid::from_u128(size.bytes() as u128),
            };
            rt.block_on(cache.set(&key, &generate_payload(size))).unwrap();

            group.throughput(Throughput::Bytes(size.bytes() as u64));
            group.bench_function(BenchmarkId::new(backend, size.name()), |b| {
                b.to_async(&rt).iter(|| async {
                    black_box(cache.get::<TestPayload>(&key).await.unwrap());
                });
            });
        }
    }
    group.finish();
}

fn bench_clear_user(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cache_clear_user");
    let payload = generate_payload(PayloadSize::Small);

    for (backend, cache) in backends(&rt) {
        // other users' entries make the pattern scan realistic
        rt.block_on(async {
            for index in 0..200_u128 {
                let user_id = Uuid::from_u128(10_000 + index);
                cache.set(&CacheKey::TodaySteps { user_id }, &payload).await.unwrap();
                cache.set(&CacheKey::TodaySupplements { user_id }, &payload).await.unwrap();
            }
        });
        let user_id = Uuid::from_u128(42);

        group.bench_function(backend, |b| {
            b.to_async(&rt).iter(|| async {
                cache.set(&CacheKey::TodaySteps { user_id }, &payload).await.unwrap();
                cache.set(&CacheKey::WorkoutProgram { user_id }, &payload).await.unwrap();
                black_box(cache.clear_user(user_id).await.unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cache_set, bench_cache_get, bench_clear_user);
criterion_main!(benches);
