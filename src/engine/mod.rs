//! Convolution Engine Module
//!
//! Core processing engine including:
//! - Decoded sample buffers
//! - Pipeline configuration
//! - The decode → convolve → normalize → encode pipeline

pub mod buffer;
pub mod config;
pub mod pipeline;

pub use buffer::{DecodedWav, SampleBuffer};
pub use config::PipelineConfig;
pub use pipeline::{Pipeline, Rendered, RunReport};
