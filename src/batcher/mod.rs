pub mod batcher;
pub mod config;
pub mod processor;
mod state;
pub mod stream;
pub mod types;

pub use batcher::Batcher;
pub use config::{Config, ConfigBuilder, ConfigBuilderError};
pub use processor::BatchProcessor;
pub use stream::ResultStream;
pub use types::{BatchError, Trigger};
