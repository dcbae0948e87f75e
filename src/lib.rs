//! # micro-batcher
//!
//! A size- and time-triggered micro-batching buffer built on Tokio.
//!
//! ## Features
//!
//! - **Size trigger**: a batch is cut as soon as `size_limit` jobs are pending
//! - **Time trigger**: partial batches are flushed after `flush_interval`
//! - **Streamed outcomes** relayed from a pluggable [`BatchProcessor`](batcher::BatchProcessor)
//! - **Graceful shutdown** that drains accepted work before closing the outcome stream
//! - **Cancellation** support through [`CancellationToken`](tokio_util::sync::CancellationToken)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use micro_batcher::batcher::{Batcher, ConfigBuilder};
//! use micro_batcher::processor::DelayProcessor;
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = Arc::new(
//!     ConfigBuilder::default()
//!         .size_limit(5usize)
//!         .flush_interval(Duration::from_secs(5))
//!         .build()?,
//! );
//! let cancel = CancellationToken::new();
//! let batcher = Batcher::start(config, Arc::new(DelayProcessor::default()), &cancel);
//! let mut results = batcher.results_out().await.unwrap();
//!
//! batcher.submit("Job 1".to_string()).await;
//! batcher.shutdown().await;
//!
//! while let Some(outcome) = results.recv().await {
//!     println!("{outcome}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`batcher`] - Trigger coordination, flushing and outcome forwarding
//! - [`processor`] - Ready-made processors

pub mod batcher;
pub mod processor;
