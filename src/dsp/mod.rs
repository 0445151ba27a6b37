//! Signal processing stages
//!
//! Convolution of real-valued sequences and peak normalization back to
//! integer samples.

mod convolver;
mod normalizer;

pub use convolver::{convolve, fft_convolve, ConvolutionMethod, Convolver};
pub use normalizer::{Normalized, Normalizer};
