// src/batcher/processor.rs

use async_trait::async_trait;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

use super::types::BatchError;

/// Turns a batch of jobs into a stream of outcomes.
///
/// The batch is handed over by value. Outcomes are sent on the returned
/// receiver, which the processor closes (by dropping its sender) once it is
/// done with the batch. Nothing requires one outcome per job: jobs the
/// processor never reports on are silently lost.
#[async_trait]
pub trait BatchProcessor<J, O>: Send + Sync {
    async fn process(&self, cancel: &CancellationToken, jobs: Vec<J>)
    -> Result<Receiver<O>, BatchError>;
}

#[async_trait]
impl<J, O, F, Fut> BatchProcessor<J, O> for F
where
    F: Fn(&CancellationToken, Vec<J>) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Receiver<O>, BatchError>> + Send,
    J: Send + 'static,
    O: Send + 'static,
{
    async fn process(
        &self,
        cancel: &CancellationToken,
        jobs: Vec<J>,
    ) -> Result<Receiver<O>, BatchError> {
        self(cancel, jobs).await
    }
}
