//! Peak Normalization
//!
//! Rescales a convolution result back into the integer range of the source
//! recording so that its peak lands on the source's peak.

use log::debug;

use crate::engine::SampleBuffer;
use crate::error::{ConvolvoError, Result};
use crate::wav::BitDepth;

/// Integer samples produced by [`Normalizer::normalize`], with the peaks used
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub samples: Vec<i16>,
    /// Largest raw value of the original signal
    pub input_peak: i16,
    /// Largest raw value of the convolution result
    pub result_peak: f64,
}

/// Scales real-valued results to integer samples of a given bit depth
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    bit_depth: BitDepth,
}

impl Normalizer {
    pub fn new(bit_depth: BitDepth) -> Self {
        Normalizer { bit_depth }
    }

    /// Scale `result` so its maximum maps onto the maximum of `original`
    ///
    /// Each output sample is `round(result[i] / max(result) * max(original))`,
    /// clamped to the bit depth's integer range. Both maxima are of the raw
    /// values, not of their magnitudes, so a signal whose largest excursion
    /// is negative is scaled relative to its positive peak.
    ///
    /// # Errors
    /// * `InvalidArgument` - if either sequence is empty
    /// * `DegenerateSignal` - if the maximum of `result` is zero
    pub fn normalize(&self, original: &SampleBuffer, result: &[f64]) -> Result<Normalized> {
        let input_peak = original.peak().ok_or_else(|| {
            ConvolvoError::InvalidArgument {
                reason: "original signal is empty".to_string(),
            }
        })?;
        if result.is_empty() {
            return Err(ConvolvoError::InvalidArgument {
                reason: "convolution result is empty".to_string(),
            });
        }

        let result_peak = result.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if result_peak == 0.0 {
            return Err(ConvolvoError::DegenerateSignal {
                reason: "convolution result peaks at zero, cannot scale".to_string(),
            });
        }

        let (min, max) = self.bit_depth.sample_range();
        let (min, max) = (f64::from(min), f64::from(max));
        let reference = f64::from(input_peak);

        let samples = result
            .iter()
            .map(|&v| (v / result_peak * reference).round().clamp(min, max) as i16)
            .collect();

        debug!(
            "Normalized {} samples (result peak {:.3}, input peak {})",
            result.len(),
            result_peak,
            input_peak
        );

        Ok(Normalized {
            samples,
            input_peak,
            result_peak,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(samples: &[i16]) -> SampleBuffer {
        SampleBuffer::from(samples.to_vec())
    }

    #[test]
    fn test_peak_maps_to_input_peak() {
        let normalizer = Normalizer::new(BitDepth::Sixteen);
        let out = normalizer
            .normalize(&buffer(&[100, 200, 300]), &[100.0, 200.0, 300.0, 0.0, 0.0])
            .unwrap();

        assert_eq!(out.samples, vec![100, 200, 300, 0, 0]);
        assert_eq!(out.input_peak, 300);
        assert_eq!(out.result_peak, 300.0);
    }

    #[test]
    fn test_rounds_instead_of_truncating() {
        let normalizer = Normalizer::new(BitDepth::Sixteen);
        // 2/3 * 10 = 6.67 -> 7, -1/3 * 10 = -3.33 -> -3
        let out = normalizer.normalize(&buffer(&[10]), &[2.0, 3.0, -1.0]).unwrap();
        assert_eq!(out.samples, vec![7, 10, -3]);
    }

    #[test]
    fn test_uses_raw_maximum_not_magnitude() {
        let normalizer = Normalizer::new(BitDepth::Sixteen);
        // Largest magnitude is -1000 but the raw maximum 100 drives the scale
        let out = normalizer.normalize(&buffer(&[-1000, 50]), &[100.0, -400.0]).unwrap();
        assert_eq!(out.input_peak, 50);
        assert_eq!(out.samples, vec![50, -200]);
    }

    #[test]
    fn test_clamps_to_16bit_range() {
        let normalizer = Normalizer::new(BitDepth::Sixteen);
        let out = normalizer.normalize(&buffer(&[32767]), &[1.0, -2.0]).unwrap();
        assert_eq!(out.samples, vec![32767, -32768]);
    }

    #[test]
    fn test_clamps_to_8bit_range() {
        let normalizer = Normalizer::new(BitDepth::Eight);
        let out = normalizer.normalize(&buffer(&[200]), &[1.0, 0.5, -1.0]).unwrap();
        assert_eq!(out.samples, vec![200, 100, 0]);
    }

    #[test]
    fn test_zero_peak_is_degenerate() {
        let normalizer = Normalizer::new(BitDepth::Sixteen);
        let result = normalizer.normalize(&buffer(&[1, 2]), &[0.0, -3.0, 0.0]);
        assert!(matches!(result, Err(ConvolvoError::DegenerateSignal { .. })));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let normalizer = Normalizer::new(BitDepth::Sixteen);
        assert!(matches!(
            normalizer.normalize(&SampleBuffer::default(), &[1.0]),
            Err(ConvolvoError::InvalidArgument { .. })
        ));
        assert!(matches!(
            normalizer.normalize(&buffer(&[1]), &[]),
            Err(ConvolvoError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_output_never_exceeds_input_peak_for_positive_signals() {
        let original = SampleBuffer::new((0..64).map(|i| ((i * 97) % 1201) as i16).collect());
        let result: Vec<f64> = (0..80).map(|i| ((i * 53) % 977) as f64 * 1.37).collect();

        let out = Normalizer::new(BitDepth::Sixteen)
            .normalize(&original, &result)
            .unwrap();
        for s in out.samples {
            assert!(s.abs() <= out.input_peak);
        }
    }
}
