use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tokio::time::Instant;

/// Mutable state shared by submitters, the coordinator loop and the result
/// forwarders. Only ever touched through the batcher's mutex.
pub(crate) struct State<J, O> {
    pub(crate) pending: VecDeque<J>,
    pub(crate) shutdown: bool,
    /// When the time trigger fires next. `None` while nothing is pending.
    pub(crate) deadline: Option<Instant>,
    pub(crate) in_flight: usize,
    /// `None` once the outcome stream has been closed.
    pub(crate) results: Option<Sender<O>>,
}

impl<J, O> State<J, O> {
    pub(crate) fn new(results: Sender<O>) -> Self {
        Self {
            pending: VecDeque::new(),
            shutdown: false,
            deadline: None,
            in_flight: 0,
            results: Some(results),
        }
    }

    /// Appends a job and returns the queue length after the append.
    pub(crate) fn enqueue(&mut self, job: J) -> usize {
        self.pending.push_back(job);
        self.pending.len()
    }

    /// Removes up to `limit` jobs from the front of the queue.
    pub(crate) fn cut_batch(&mut self, limit: usize) -> Vec<J> {
        let take = limit.min(self.pending.len());
        self.pending.drain(..take).collect()
    }

    pub(crate) fn arm(&mut self, interval: Duration) {
        self.deadline = Some(Instant::now() + interval);
    }

    pub(crate) fn disarm(&mut self) {
        self.deadline = None;
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.shutdown && self.pending.is_empty() && self.in_flight == 0
    }

    /// Drops the coordinator's sender. Returns `true` only for the call that
    /// actually closed the stream.
    pub(crate) fn close(&mut self) -> bool {
        self.results.take().is_some()
    }
}
