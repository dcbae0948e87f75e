use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc::Receiver;

/// Consumer side of the batcher's outcome stream.
///
/// Outcomes of one batch arrive in the order the processor emitted them;
/// outcomes of batches in flight at the same time may interleave. The stream
/// ends after a graceful shutdown has drained every accepted job. It never
/// ends because of cancellation.
pub struct ResultStream<O> {
    receiver: Receiver<O>,
}

impl<O> ResultStream<O> {
    pub(crate) fn new(receiver: Receiver<O>) -> Self {
        Self { receiver }
    }

    /// Waits for the next outcome. Returns `None` once the stream is closed.
    pub async fn recv(&mut self) -> Option<O> {
        self.receiver.recv().await
    }

    /// Returns an outcome if one is ready, without waiting.
    pub fn try_recv(&mut self) -> Option<O> {
        self.receiver.try_recv().ok()
    }
}

impl<O> Stream for ResultStream<O> {
    type Item = O;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<O>> {
        self.receiver.poll_recv(cx)
    }
}
