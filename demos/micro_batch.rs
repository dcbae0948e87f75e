//! Micro-batching demo: eight jobs, the first five cut by the size trigger and
//! the remaining three by the time trigger.
//!
//! Run with: cargo run --example micro_batch
//!
//! Tunable through the environment (or a `.env` file):
//! `BATCH_SIZE_LIMIT`, `BATCH_FLUSH_INTERVAL_MS`, `BATCH_JOB_COUNT`.

use micro_batcher::batcher::{Batcher, ConfigBuilder};
use micro_batcher::processor::DelayProcessor;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

struct DemoConfig {
    size_limit: usize,
    flush_interval: Duration,
    job_count: usize,
}

impl DemoConfig {
    fn load() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        Ok(DemoConfig {
            size_limit: var_or("BATCH_SIZE_LIMIT", 5)?,
            flush_interval: Duration::from_millis(var_or("BATCH_FLUSH_INTERVAL_MS", 5000)?),
            job_count: var_or("BATCH_JOB_COUNT", 8)?,
        })
    }
}

fn var_or<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    match env::var(key) {
        Ok(value) => Ok(value.parse()?),
        Err(_) => Ok(default),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "micro_batcher=info".into()),
        )
        .init();

    let demo = DemoConfig::load()?;
    let config = Arc::new(
        ConfigBuilder::default()
            .size_limit(demo.size_limit)
            .flush_interval(demo.flush_interval)
            .build()?,
    );

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("shutting down");
            cancel_on_signal.cancel();
        }
    });

    let batcher = Batcher::start(config, Arc::new(DelayProcessor::default()), &cancel);
    let mut results = batcher
        .results_out()
        .await
        .ok_or("result stream already taken")?;

    println!("Starting micro-batcher...");
    println!("- Size limit: {}", demo.size_limit);
    println!("- Flush interval: {:?}", demo.flush_interval);
    println!("- Submitting {} jobs\n", demo.job_count);

    for i in 1..=demo.job_count {
        batcher.submit(format!("Job {}", i)).await;
    }
    batcher.shutdown().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = results.recv() => match outcome {
                Some(outcome) => {
                    let at = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
                    println!("{} at {}", outcome, at);
                }
                None => break,
            },
        }
    }

    println!("\nMicro-batcher drained!");
    Ok(())
}
