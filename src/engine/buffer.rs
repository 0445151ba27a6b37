//! Sample Buffer Management
//!
//! Decoded PCM samples and the file value that owns them. Samples are kept
//! as one flat sequence of PCM units; multi-channel files stay interleaved.

use num_traits::Float;

use crate::wav::WavHeader;

// ============================================================================
// SampleBuffer
// ============================================================================

/// Ordered sequence of decoded integer samples
///
/// 16-bit files decode to their signed values. 8-bit files decode to the raw
/// unsigned byte value (0..=255), widened without re-centering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<i16>,
}

impl SampleBuffer {
    pub fn new(samples: Vec<i16>) -> Self {
        SampleBuffer { samples }
    }

    /// Number of samples across all channels
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.samples
    }

    /// Largest raw sample value (not the largest magnitude)
    ///
    /// # Returns
    /// `None` for an empty buffer
    pub fn peak(&self) -> Option<i16> {
        self.samples.iter().copied().max()
    }

    /// Widen every sample to a real value, preserving its integer magnitude
    pub fn to_real<T: Float + From<i16>>(&self) -> Vec<T> {
        self.samples.iter().map(|&s| s.into()).collect()
    }
}

impl From<Vec<i16>> for SampleBuffer {
    fn from(samples: Vec<i16>) -> Self {
        SampleBuffer::new(samples)
    }
}

// ============================================================================
// DecodedWav
// ============================================================================

/// A decoded WAV file: its header and the samples it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedWav {
    header: WavHeader,
    samples: SampleBuffer,
}

impl DecodedWav {
    pub fn new(header: WavHeader, samples: SampleBuffer) -> Self {
        DecodedWav { header, samples }
    }

    pub fn header(&self) -> &WavHeader {
        &self.header
    }

    pub fn samples(&self) -> &SampleBuffer {
        &self.samples
    }
}
