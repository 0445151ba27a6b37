//! Linear Convolution
//!
//! Direct time-domain convolution, with an FFT path that produces the same
//! values within floating-point tolerance.

use log::debug;
use num_traits::Float;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::error::{ConvolvoError, Result};

/// Algorithm used to compute the convolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ConvolutionMethod {
    /// O(N·M) accumulation, the reference result
    #[default]
    Direct,
    /// Zero-padded FFT multiply, O((N+M) log(N+M))
    Fft,
}

/// Convolves real-valued sample sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct Convolver {
    method: ConvolutionMethod,
}

impl Convolver {
    pub fn new(method: ConvolutionMethod) -> Self {
        Convolver { method }
    }

    /// Convolve `x` with `h` using the configured method
    ///
    /// # Returns
    /// A sequence of length `x.len() + h.len() - 1`
    ///
    /// # Errors
    /// * `InvalidArgument` - if either input is empty
    pub fn convolve(&self, x: &[f64], h: &[f64]) -> Result<Vec<f64>> {
        debug!(
            "Convolving {} x {} samples ({:?})",
            x.len(),
            h.len(),
            self.method
        );
        match self.method {
            ConvolutionMethod::Direct => convolve(x, h),
            ConvolutionMethod::Fft => fft_convolve(x, h),
        }
    }
}

/// Direct linear convolution: `y[n + m] += x[n] * h[m]`
///
/// # Errors
/// * `InvalidArgument` - if either input is empty
pub fn convolve<T: Float>(x: &[T], h: &[T]) -> Result<Vec<T>> {
    check_inputs(x.len(), h.len())?;

    let mut y = vec![T::zero(); x.len() + h.len() - 1];
    for (n, &xn) in x.iter().enumerate() {
        for (acc, &hm) in y[n..n + h.len()].iter_mut().zip(h) {
            *acc = *acc + xn * hm;
        }
    }

    Ok(y)
}

/// FFT-based linear convolution
///
/// Both inputs are zero-padded to the next power of two at or above
/// `x.len() + h.len() - 1`, multiplied in the frequency domain, and the
/// scaled real part of the inverse transform is truncated to length.
///
/// # Errors
/// * `InvalidArgument` - if either input is empty
pub fn fft_convolve(x: &[f64], h: &[f64]) -> Result<Vec<f64>> {
    check_inputs(x.len(), h.len())?;

    let output_len = x.len() + h.len() - 1;
    let fft_size = output_len.next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(fft_size);
    let inverse = planner.plan_fft_inverse(fft_size);

    let mut x_spec = zero_padded(x, fft_size);
    let mut h_spec = zero_padded(h, fft_size);
    forward.process(&mut x_spec);
    forward.process(&mut h_spec);

    for (xs, hs) in x_spec.iter_mut().zip(&h_spec) {
        *xs *= hs;
    }
    inverse.process(&mut x_spec);

    // rustfft leaves the inverse unnormalized
    let scale = fft_size as f64;
    Ok(x_spec
        .iter()
        .take(output_len)
        .map(|c| c.re / scale)
        .collect())
}

fn check_inputs(x_len: usize, h_len: usize) -> Result<()> {
    if x_len == 0 || h_len == 0 {
        return Err(ConvolvoError::InvalidArgument {
            reason: format!(
                "cannot convolve empty sequences (signal: {} samples, impulse: {} samples)",
                x_len, h_len
            ),
        });
    }
    Ok(())
}

fn zero_padded(values: &[f64], len: usize) -> Vec<Complex<f64>> {
    let mut padded = vec![Complex::new(0.0, 0.0); len];
    for (slot, &v) in padded.iter_mut().zip(values) {
        slot.re = v;
    }
    padded
}
