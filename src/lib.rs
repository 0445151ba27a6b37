//! Convolvo - WAV Convolution
//!
//! Convolves a PCM WAV recording with an impulse response and writes the
//! result as a new WAV file, rescaled so its peak matches the recording's.
//!
//! # Architecture
//!
//! - `wav`: canonical 44-byte header, 8/16-bit PCM decode and encode
//! - `dsp`: direct and FFT convolution, peak normalization
//! - `engine`: sample buffers, configuration and the pipeline that ties
//!   the stages together
//! - `cli`: argument model and command implementation for the binary

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod wav;

pub use engine::{DecodedWav, Pipeline, PipelineConfig, RunReport, SampleBuffer};
pub use error::{ConvolvoError, Result, Stage};
