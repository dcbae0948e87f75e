use std::fmt;

use thiserror::Error;

/// Errors that can occur while a batch is being processed.
///
/// None of these reach `submit` or `shutdown` callers: the batcher logs them
/// and treats the batch as finished.
#[derive(Debug, Error)]
pub enum BatchError {
    /// A processor failed with an error.
    ///
    /// Preserves the source error for debugging.
    #[error("processor failed")]
    ProcessorError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Processing was cancelled via the cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// The result consumer went away before every outcome was delivered.
    #[error("result stream closed")]
    ResultsClosed,

    /// The batcher configuration was rejected.
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<super::config::ConfigBuilderError> for BatchError {
    fn from(err: super::config::ConfigBuilderError) -> Self {
        BatchError::Config(err.to_string())
    }
}

/// What caused a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The pending queue reached the size limit.
    Size,
    /// The flush interval elapsed with work pending.
    Time,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Size => f.write_str("size"),
            Trigger::Time => f.write_str("time"),
        }
    }
}
