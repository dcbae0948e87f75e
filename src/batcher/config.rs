// src/batcher/config.rs

use derive_builder::Builder;
use std::time::Duration;

#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Config {
    /// Number of pending jobs that triggers an immediate flush.
    /// Also the upper bound on every dispatched batch.
    #[builder(default = "5")]
    pub(crate) size_limit: usize,

    /// Maximum time a job waits before a partial batch is flushed
    #[builder(default = "Duration::from_secs(5)")]
    pub(crate) flush_interval: Duration,

    /// Capacity of the outbound outcome channel
    #[builder(default = "64")]
    pub(crate) result_buffer: usize,
}

impl ConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.size_limit == Some(0) {
            return Err("size_limit must be positive".to_string());
        }
        if self.flush_interval == Some(Duration::ZERO) {
            return Err("flush_interval must be positive".to_string());
        }
        if self.result_buffer == Some(0) {
            return Err("result_buffer must be positive".to_string());
        }
        Ok(())
    }
}

impl Config {
    /// Returns the maximum number of jobs per batch
    #[inline]
    pub fn size_limit(&self) -> usize {
        self.size_limit
    }

    /// Returns the interval after which a partial batch is flushed
    #[inline]
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Returns the capacity of the outcome channel
    #[inline]
    pub fn result_buffer(&self) -> usize {
        self.result_buffer
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            size_limit: 5,
            flush_interval: Duration::from_secs(5),
            result_buffer: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batcher::BatchError;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::default().build().unwrap();
        assert_eq!(config.size_limit(), 5);
        assert_eq!(config.flush_interval(), Duration::from_secs(5));
        assert_eq!(config.result_buffer(), 64);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::default()
            .size_limit(10usize)
            .flush_interval(Duration::from_millis(250))
            .result_buffer(1usize)
            .build()
            .unwrap();
        assert_eq!(config.size_limit(), 10);
        assert_eq!(config.flush_interval(), Duration::from_millis(250));
        assert_eq!(config.result_buffer(), 1);
    }

    #[test]
    fn test_builder_rejects_zero_size_limit() {
        let err = ConfigBuilder::default()
            .size_limit(0usize)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("size_limit must be positive"));
    }

    #[test]
    fn test_builder_rejects_zero_interval() {
        let err = ConfigBuilder::default()
            .flush_interval(Duration::ZERO)
            .build()
            .unwrap_err();

        let err = BatchError::from(err);
        assert!(matches!(err, BatchError::Config(msg) if msg.contains("flush_interval")));
    }
}
