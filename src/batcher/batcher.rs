use std::sync::Arc;
use tokio::sync::{Mutex, Notify, mpsc};
use tokio::time::sleep_until;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::Config;
use super::processor::BatchProcessor;
use super::state::State;
use super::stream::ResultStream;
use super::types::{BatchError, Trigger};

/// Groups individually submitted jobs into batches and hands them to a
/// [`BatchProcessor`].
///
/// A batch is cut as soon as `size_limit` jobs are pending, or when
/// `flush_interval` has passed since the queue became non-empty, whichever
/// comes first. Outcomes are relayed to a single [`ResultStream`].
///
/// `Batcher` is a handle: clones share the same queue and coordinator.
pub struct Batcher<J, O> {
    shared: Arc<Shared<J, O>>,
}

impl<J, O> Clone for Batcher<J, O> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

struct Shared<J, O> {
    config: Arc<Config>,
    processor: Arc<dyn BatchProcessor<J, O>>,
    state: Mutex<State<J, O>>,
    results: Mutex<Option<ResultStream<O>>>,
    size_reached: Notify,
    timer_rearmed: Notify,
    /// Cancelled by the terminal drain to end the coordinator loop.
    stop: CancellationToken,
    /// External cancellation supplied by the caller.
    cancel: CancellationToken,
    /// Cancelled when the coordinator loop has exited.
    finished: CancellationToken,
}

impl<J, O> Batcher<J, O>
where
    J: Send + 'static,
    O: Send + 'static,
{
    /// Creates a batcher and spawns its coordinator on the current Tokio
    /// runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start<P>(config: Arc<Config>, processor: Arc<P>, cancel: &CancellationToken) -> Self
    where
        P: BatchProcessor<J, O> + 'static,
    {
        let processor: Arc<dyn BatchProcessor<J, O>> = processor;
        let (sender, receiver) = mpsc::channel(config.result_buffer);

        let shared = Arc::new(Shared {
            config,
            processor,
            state: Mutex::new(State::new(sender)),
            results: Mutex::new(Some(ResultStream::new(receiver))),
            size_reached: Notify::new(),
            timer_rearmed: Notify::new(),
            stop: CancellationToken::new(),
            cancel: cancel.clone(),
            finished: CancellationToken::new(),
        });

        tokio::spawn(shared.clone().run());

        Self { shared }
    }

    /// Queues a job for the next batch.
    ///
    /// Once [`shutdown`](Self::shutdown) has been called, or the cancellation
    /// token has fired, the job is dropped without any signal to the caller.
    pub async fn submit(&self, job: J) {
        let shared = &self.shared;
        let len = {
            let mut state = shared.state.lock().await;
            if state.shutdown {
                debug!("batcher is shut down, dropping job");
                return;
            }
            if shared.cancel.is_cancelled() {
                debug!("batcher is cancelled, dropping job");
                return;
            }

            let len = state.enqueue(job);
            if len == 1 {
                state.arm(shared.config.flush_interval);
                shared.timer_rearmed.notify_one();
            }
            len
        };

        debug!(pending = len, "job queued");

        if len == shared.config.size_limit {
            shared.size_reached.notify_one();
        }
    }

    /// Stops accepting jobs. Work already queued is still flushed and its
    /// outcomes delivered; the result stream closes once everything drained.
    ///
    /// Calling it again has no further effect.
    pub async fn shutdown(&self) {
        let mut state = self.shared.state.lock().await;
        if state.shutdown {
            debug!("shutdown already requested");
            return;
        }

        state.shutdown = true;
        info!(
            pending = state.pending.len(),
            in_flight = state.in_flight,
            "shutdown requested"
        );

        // Nothing left to trigger a forwarder, so close here.
        if state.is_drained() {
            self.shared.terminate(&mut state);
        }
    }

    /// Takes the consumer handle of the outcome stream.
    ///
    /// There is a single consumer: the first call returns the stream and any
    /// later call returns `None`.
    pub async fn results_out(&self) -> Option<ResultStream<O>> {
        self.shared.results.lock().await.take()
    }

    pub async fn pending_len(&self) -> usize {
        self.shared.state.lock().await.pending.len()
    }

    /// Number of batches dispatched whose outcomes are still being relayed.
    pub async fn in_flight(&self) -> usize {
        self.shared.state.lock().await.in_flight
    }

    pub async fn is_shutdown(&self) -> bool {
        self.shared.state.lock().await.shutdown
    }

    /// Returns `true` while the coordinator loop is running.
    pub fn is_running(&self) -> bool {
        !self.shared.finished.is_cancelled()
    }

    /// Waits until the coordinator loop has exited, either through a
    /// completed drain or through cancellation.
    pub async fn stopped(&self) {
        self.shared.finished.cancelled().await;
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }
}

impl<J, O> Shared<J, O>
where
    J: Send + 'static,
    O: Send + 'static,
{
    async fn run(self: Arc<Self>) {
        loop {
            let deadline = self.state.lock().await.deadline;
            let timer = async {
                match deadline {
                    Some(deadline) => sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    info!("batcher cancelled");
                    break;
                }

                _ = self.stop.cancelled() => {
                    info!("batcher drained, stopping");
                    break;
                }

                _ = self.size_reached.notified() => {
                    self.flush(Trigger::Size).await;
                }

                _ = timer => {
                    self.flush(Trigger::Time).await;
                }

                // Queue went from empty to non-empty; pick up the new deadline.
                _ = self.timer_rearmed.notified() => {}
            }
        }

        self.finished.cancel();
    }

    async fn flush(self: &Arc<Self>, trigger: Trigger) {
        let size_limit = self.config.size_limit;
        let (batch, sender, remaining) = {
            let mut state = self.state.lock().await;
            state.disarm();

            let batch = state.cut_batch(size_limit);
            let remaining = state.pending.len();
            if remaining > 0 {
                state.arm(self.config.flush_interval);
            }
            if remaining >= size_limit {
                self.size_reached.notify_one();
            }

            if batch.is_empty() {
                return;
            }
            let Some(sender) = state.results.clone() else {
                warn!(dropped = batch.len(), "result stream already closed");
                return;
            };
            state.in_flight += 1;
            (batch, sender, remaining)
        };

        info!(
            %trigger,
            batch_size = batch.len(),
            remaining,
            "dispatching batch"
        );

        let shared = self.clone();
        tokio::spawn(async move {
            shared.forward(batch, sender).await;
        });
    }

    /// Runs one batch through the processor and relays its outcomes.
    async fn forward(self: Arc<Self>, batch: Vec<J>, sender: mpsc::Sender<O>) {
        let batch_size = batch.len();
        match self.processor.process(&self.cancel, batch).await {
            Ok(outcomes) => match self.relay(outcomes, &sender).await {
                Ok(forwarded) => debug!(batch_size, forwarded, "batch finished"),
                Err(BatchError::ResultsClosed) => warn!(
                    batch_size,
                    error = %BatchError::ResultsClosed,
                    "discarding remaining outcomes"
                ),
                Err(e) => debug!(batch_size, reason = %e, "stopped relaying outcomes"),
            },
            Err(e) => {
                error!(batch_size, error = %e, "processor failed, batch dropped");
            }
        }

        drop(sender);
        self.finish_batch().await;
    }

    /// Moves outcomes from the processor into the result stream until the
    /// processor is done. Returns how many outcomes were delivered.
    async fn relay(
        &self,
        mut outcomes: mpsc::Receiver<O>,
        sender: &mpsc::Sender<O>,
    ) -> Result<usize, BatchError> {
        let mut forwarded = 0usize;
        loop {
            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => return Err(BatchError::Cancelled),
                outcome = outcomes.recv() => outcome,
            };
            let Some(outcome) = outcome else {
                return Ok(forwarded);
            };
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(BatchError::Cancelled),
                sent = sender.send(outcome) => {
                    sent.map_err(|_| BatchError::ResultsClosed)?;
                }
            }
            forwarded += 1;
        }
    }

    async fn finish_batch(&self) {
        let mut state = self.state.lock().await;
        state.in_flight -= 1;
        if state.is_drained() && !self.cancel.is_cancelled() {
            self.terminate(&mut state);
        }
    }

    /// Closes the outcome stream and ends the coordinator loop. The caller
    /// must hold the state lock.
    fn terminate(&self, state: &mut State<J, O>) {
        if state.close() {
            info!("all accepted jobs drained, closing result stream");
            self.stop.cancel();
        }
    }
}
