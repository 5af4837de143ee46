//! Merge pipeline benchmarks against an in-memory share.
//!
//! Run with: `cargo bench --package boxmerge-bench`

use boxmerge_bench::BenchmarkConfig;
use boxmerge_lib::{
    ChunkSize, Dispatcher, FetchConfig, MergeJob, PoolConfig, Progress, RetryPolicy, run_merge,
};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::runtime::Runtime;

fn config() -> BenchmarkConfig {
    BenchmarkConfig {
        rooms: 3,
        boxes_per_room: 2,
        days: 90,
        day_bytes: 32 * 1024,
        gap: 7,
    }
}

fn workers_benchmark(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let config = config();
    let share = Arc::new(config.share());
    let layout = config.layout();

    let mut group = c.benchmark_group("merge_workers");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));
    group.throughput(Throughput::Bytes(config.total_bytes()));

    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let temp_dir = TempDir::new().unwrap();
            let job = MergeJob::new(layout.base.clone(), temp_dir.path().join("out")).with_pool(
                PoolConfig {
                    workers,
                    fail_fast: false,
                },
            );

            b.to_async(&runtime).iter(|| {
                let share = share.clone();
                let dispatcher = Arc::new(Dispatcher::new(&layout, config.range()));
                let job = job.clone();
                async move {
                    run_merge(share, dispatcher, &job, Progress::new())
                        .await
                        .unwrap()
                }
            });
        });
    }

    group.finish();
}

fn chunk_size_benchmark(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let config = config();
    let share = Arc::new(config.share());
    let layout = config.layout();

    let mut group = c.benchmark_group("merge_chunk_size");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(config.total_bytes()));

    for kib in [1, 16, 64, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(kib), &kib, |b, &kib| {
            let temp_dir = TempDir::new().unwrap();
            let fetch = FetchConfig {
                chunk_size: ChunkSize::from_kib(kib, 1024),
                retry: RetryPolicy::NONE,
            };
            let job = MergeJob::new(layout.base.clone(), temp_dir.path().join("out"))
                .with_fetch(fetch)
                .with_pool(PoolConfig {
                    workers: 4,
                    fail_fast: false,
                });

            b.to_async(&runtime).iter(|| {
                let share = share.clone();
                let dispatcher = Arc::new(Dispatcher::new(&layout, config.range()));
                let job = job.clone();
                async move {
                    run_merge(share, dispatcher, &job, Progress::new())
                        .await
                        .unwrap()
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, workers_benchmark, chunk_size_benchmark);
criterion_main!(benches);
