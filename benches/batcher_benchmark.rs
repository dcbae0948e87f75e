use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use micro_batcher::batcher::{BatchError, BatchProcessor, Batcher, ConfigBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, Receiver};
use tokio_util::sync::CancellationToken;

/// Processor that reports every job back immediately
struct EchoProcessor;

#[async_trait]
impl BatchProcessor<u64, u64> for EchoProcessor {
    async fn process(
        &self,
        _cancel: &CancellationToken,
        jobs: Vec<u64>,
    ) -> Result<Receiver<u64>, BatchError> {
        let (tx, rx) = mpsc::channel(jobs.len());
        for job in jobs {
            let _ = tx.try_send(job);
        }
        Ok(rx)
    }
}

async fn submit_and_drain(size_limit: usize, jobs: u64) {
    let config = Arc::new(
        ConfigBuilder::default()
            .size_limit(size_limit)
            .flush_interval(Duration::from_millis(10))
            .result_buffer(1024usize)
            .build()
            .unwrap(),
    );
    let cancel = CancellationToken::new();
    let batcher = Batcher::start(config, Arc::new(EchoProcessor), &cancel);
    let mut results = batcher.results_out().await.unwrap();

    let consumer = tokio::spawn(async move {
        let mut received = 0u64;
        while results.recv().await.is_some() {
            received += 1;
        }
        received
    });

    for job in 0..jobs {
        batcher.submit(job).await;
    }
    batcher.shutdown().await;

    assert_eq!(consumer.await.unwrap(), jobs);
}

fn bench_batch_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("batcher_batch_sizes");
    group.sample_size(10);
    let runtime = tokio::runtime::Runtime::new().unwrap();

    const JOBS: u64 = 10_000;
    for size_limit in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(JOBS));
        group.bench_with_input(
            BenchmarkId::from_parameter(size_limit),
            &size_limit,
            |b, &size_limit| {
                b.to_async(&runtime)
                    .iter(|| async move { submit_and_drain(size_limit, JOBS).await });
            },
        );
    }

    group.finish();
}

fn bench_concurrent_submitters(c: &mut Criterion) {
    let mut group = c.benchmark_group("batcher_concurrent_submitters");
    group.sample_size(10);
    let runtime = tokio::runtime::Runtime::new().unwrap();

    for submitters in [1u64, 4, 16] {
        group.throughput(Throughput::Elements(submitters * 1000));
        group.bench_with_input(
            BenchmarkId::from_parameter(submitters),
            &submitters,
            |b, &submitters| {
                b.to_async(&runtime).iter(|| async move {
                    let config = Arc::new(
                        ConfigBuilder::default()
                            .size_limit(100usize)
                            .flush_interval(Duration::from_millis(10))
                            .build()
                            .unwrap(),
                    );
                    let cancel = CancellationToken::new();
                    let batcher = Batcher::start(config, Arc::new(EchoProcessor), &cancel);
                    let mut results = batcher.results_out().await.unwrap();
                    let consumer =
                        tokio::spawn(async move { while results.recv().await.is_some() {} });

                    let mut handles = Vec::new();
                    for worker in 0..submitters {
                        let batcher = batcher.clone();
                        handles.push(tokio::spawn(async move {
                            for i in 0..1000 {
                                batcher.submit(worker * 1000 + i).await;
                            }
                        }));
                    }
                    for handle in handles {
                        handle.await.unwrap();
                    }
                    batcher.shutdown().await;
                    consumer.await.unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_batch_sizes, bench_concurrent_submitters);
criterion_main!(benches);
