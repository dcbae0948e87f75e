use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, Receiver};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::batcher::{BatchError, BatchProcessor};

/// Processor that pretends to work on each job for a fixed delay and reports
/// `"data <job> successfully processed"`.
///
/// Jobs are worked through one at a time in a background task; the outcome
/// for a job is sent as soon as its delay has passed.
#[derive(Debug, Clone)]
pub struct DelayProcessor {
    delay: Duration,
}

impl DelayProcessor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for DelayProcessor {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

#[async_trait]
impl<J> BatchProcessor<J, String> for DelayProcessor
where
    J: Display + Send + 'static,
{
    async fn process(
        &self,
        cancel: &CancellationToken,
        jobs: Vec<J>,
    ) -> Result<Receiver<String>, BatchError> {
        let (tx, rx) = mpsc::channel(1);
        let delay = self.delay;
        let cancel = cancel.clone();

        tokio::spawn(async move {
            for job in jobs {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("delay processor cancelled");
                        return;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }

                if tx
                    .send(format!("data {} successfully processed", job))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_emits_one_outcome_per_job_in_order() {
        let processor = DelayProcessor::default();
        let cancel = CancellationToken::new();

        let mut rx = processor
            .process(&cancel, vec!["Job 1", "Job 2"])
            .await
            .unwrap();

        assert_eq!(
            rx.recv().await.as_deref(),
            Some("data Job 1 successfully processed")
        );
        assert_eq!(
            rx.recv().await.as_deref(),
            Some("data Job 2 successfully processed")
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcomes_are_spaced_by_delay() {
        let processor = DelayProcessor::new(Duration::from_millis(100));
        let cancel = CancellationToken::new();
        let start = tokio::time::Instant::now();

        let mut rx = processor.process(&cancel, vec![1, 2, 3]).await.unwrap();
        while rx.recv().await.is_some() {}

        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_cancelled() {
        let processor = DelayProcessor::new(Duration::from_secs(10));
        let cancel = CancellationToken::new();

        let mut rx = processor.process(&cancel, vec![1, 2, 3]).await.unwrap();
        cancel.cancel();

        assert_eq!(rx.recv().await, None);
    }
}
