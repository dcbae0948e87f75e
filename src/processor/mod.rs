//! Processors that can be plugged into a [`Batcher`](crate::batcher::Batcher).

pub mod delay;

pub use delay::DelayProcessor;
