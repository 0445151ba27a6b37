//! Canonical PCM WAV header
//!
//! Field layout of the 44-byte RIFF/WAVE header and the typed descriptor
//! that both the decoder and the encoder work with.

use crate::error::{ConvolvoError, Result};

// ============================================================================
// Layout constants
// ============================================================================

/// Length of the canonical header; the PCM payload starts here
pub const HEADER_LEN: usize = 44;

/// `formatTag` value for uncompressed PCM
pub const PCM_FORMAT_TAG: u16 = 1;

/// `formatTag` of WAVE_FORMAT_EXTENSIBLE; the real encoding is in the subformat GUID
pub const EXTENSIBLE_FORMAT_TAG: u16 = 0xFFFE;

/// Size of a PCM `fmt ` chunk body
pub const FMT_CHUNK_LEN: u32 = 16;

/// Size of a WAVE_FORMAT_EXTENSIBLE `fmt ` chunk body
pub const EXTENSIBLE_FMT_LEN: u32 = 40;

/// Position of the subformat GUID inside an extensible `fmt ` body
pub(crate) const SUB_FORMAT_OFFSET: u64 = 24;

/// Bytes of the RIFF form that precede the data payload, minus the 8-byte RIFF preamble
pub const FORM_OVERHEAD: u32 = 36;

pub(crate) const RIFF_SIZE_OFFSET: u64 = 4;
pub(crate) const FMT_SIZE_OFFSET: u64 = 16;
pub(crate) const FORMAT_TAG_OFFSET: u64 = 20;
pub(crate) const DATA_SIZE_OFFSET: u64 = 40;
pub(crate) const DATA_ID_OFFSET: usize = 36;

// ============================================================================
// Bit depth
// ============================================================================

/// Supported PCM sample widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    /// Unsigned bytes, widened without re-centering
    Eight,
    /// Signed little-endian 16-bit
    Sixteen,
}

impl BitDepth {
    /// Map a `bitsPerSample` header value to a supported depth
    pub fn from_bits(bits: u16) -> Result<Self> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            other => Err(ConvolvoError::malformed(format!(
                "unsupported bits per sample: {} (only 8 and 16 supported)",
                other
            ))),
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }

    pub fn bytes(self) -> u16 {
        self.bits() / 8
    }

    /// Inclusive integer range a sample of this depth can hold.
    ///
    /// 8-bit samples are kept as raw unsigned byte values, so their range is
    /// `0..=255` rather than a signed range centered on zero.
    pub fn sample_range(self) -> (i16, i16) {
        match self {
            BitDepth::Eight => (0, 255),
            BitDepth::Sixteen => (i16::MIN, i16::MAX),
        }
    }
}

// ============================================================================
// PCM format descriptor
// ============================================================================

/// Channel count, bit depth and sample rate of a PCM stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: u16,
    pub bit_depth: BitDepth,
    pub sample_rate: u32,
}

impl PcmFormat {
    pub fn new(channels: u16, bit_depth: BitDepth, sample_rate: u32) -> Self {
        PcmFormat {
            channels,
            bit_depth,
            sample_rate,
        }
    }

    /// Create a mono 16-bit format
    pub fn mono_16(sample_rate: u32) -> Self {
        Self::new(1, BitDepth::Sixteen, sample_rate)
    }

    /// Bytes per frame (one sample for every channel)
    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(self.bit_depth.bytes())
    }

    /// Bytes per second of audio
    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate.checked_mul(self.block_align() as u32)
    }
}

impl From<&WavHeader> for PcmFormat {
    fn from(header: &WavHeader) -> Self {
        PcmFormat::new(header.channels, header.bit_depth, header.sample_rate)
    }
}

// ============================================================================
// Header
// ============================================================================

/// Header fields exactly as they were read, before validation
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RawHeader {
    pub riff_size: u32,
    pub fmt_size: u32,
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
    /// Leading two bytes of the subformat GUID, for extensible `fmt ` chunks
    pub sub_format: Option<u16>,
}

/// Parsed and validated WAV header. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    riff_size: u32,
    fmt_size: u32,
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bit_depth: BitDepth,
    data_size: u32,
}

impl WavHeader {
    /// Build the header for `frames` frames of audio in the given format.
    ///
    /// # Errors
    /// * `InvalidArgument` - if the format has no channels or the payload
    ///   would not fit in the 32-bit size fields
    pub fn for_frames(format: PcmFormat, frames: usize) -> Result<Self> {
        if format.channels == 0 {
            return Err(ConvolvoError::InvalidArgument {
                reason: "channel count must be at least 1".to_string(),
            });
        }

        let too_large = || ConvolvoError::InvalidArgument {
            reason: format!("{} frames do not fit in a WAV data chunk", frames),
        };

        let data_size = u32::try_from(frames)
            .ok()
            .and_then(|f| f.checked_mul(format.channels as u32))
            .and_then(|s| s.checked_mul(format.bit_depth.bytes() as u32))
            .ok_or_else(too_large)?;
        let riff_size = data_size.checked_add(FORM_OVERHEAD).ok_or_else(too_large)?;
        let block_align = u16::try_from(format.channels as u32 * format.bit_depth.bytes() as u32)
            .map_err(|_| ConvolvoError::InvalidArgument {
                reason: format!("{} channels exceed the WAV frame size limit", format.channels),
            })?;
        let byte_rate = format.byte_rate().ok_or_else(|| ConvolvoError::InvalidArgument {
            reason: format!("sample rate {} Hz is too high", format.sample_rate),
        })?;

        Ok(WavHeader {
            riff_size,
            fmt_size: FMT_CHUNK_LEN,
            format_tag: PCM_FORMAT_TAG,
            channels: format.channels,
            sample_rate: format.sample_rate,
            byte_rate,
            block_align,
            bit_depth: format.bit_depth,
            data_size,
        })
    }

    /// Validate raw fields read from a file
    pub(crate) fn from_raw(raw: RawHeader) -> Result<Self> {
        match (raw.format_tag, raw.sub_format) {
            (PCM_FORMAT_TAG, _) => {}
            (EXTENSIBLE_FORMAT_TAG, Some(PCM_FORMAT_TAG)) => {}
            (EXTENSIBLE_FORMAT_TAG, Some(sub_format)) => {
                return Err(ConvolvoError::malformed(format!(
                    "extensible subformat {} is not PCM (compressed encodings are not supported)",
                    sub_format
                )));
            }
            (tag, _) => {
                return Err(ConvolvoError::malformed(format!(
                    "format tag {} is not PCM (compressed encodings are not supported)",
                    tag
                )));
            }
        }
        if raw.channels == 0 {
            return Err(ConvolvoError::malformed("channel count is zero"));
        }
        if raw.sample_rate == 0 {
            return Err(ConvolvoError::malformed("sample rate is zero"));
        }

        let bit_depth = BitDepth::from_bits(raw.bits_per_sample)?;

        let expected_align = raw.channels as u32 * bit_depth.bytes() as u32;
        if raw.block_align as u32 != expected_align {
            return Err(ConvolvoError::malformed(format!(
                "block align {} does not match {} channel(s) of {}-bit audio",
                raw.block_align,
                raw.channels,
                bit_depth.bits()
            )));
        }
        if raw.data_size % raw.block_align as u32 != 0 {
            return Err(ConvolvoError::malformed(format!(
                "data size {} is not a whole number of {}-byte frames",
                raw.data_size, raw.block_align
            )));
        }

        Ok(WavHeader {
            riff_size: raw.riff_size,
            fmt_size: raw.fmt_size,
            format_tag: raw.format_tag,
            channels: raw.channels,
            sample_rate: raw.sample_rate,
            byte_rate: raw.byte_rate,
            block_align: raw.block_align,
            bit_depth,
            data_size: raw.data_size,
        })
    }

    /// RIFF form size (offset 4)
    pub fn riff_size(&self) -> u32 {
        self.riff_size
    }

    /// `fmt ` chunk size (offset 16)
    pub fn fmt_size(&self) -> u32 {
        self.fmt_size
    }

    pub fn format_tag(&self) -> u16 {
        self.format_tag
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bytes per second as stored in the header
    pub fn byte_rate(&self) -> u32 {
        self.byte_rate
    }

    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bit_depth.bits()
    }

    /// Byte length of the PCM payload
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// Number of individual PCM samples in the payload (all channels)
    pub fn sample_count(&self) -> usize {
        self.data_size as usize / self.bit_depth.bytes() as usize
    }

    /// Number of frames in the payload
    pub fn frame_count(&self) -> usize {
        self.data_size as usize / self.block_align as usize
    }

    pub fn format(&self) -> PcmFormat {
        PcmFormat::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_mono_16(data_size: u32) -> RawHeader {
        RawHeader {
            riff_size: FORM_OVERHEAD + data_size,
            fmt_size: FMT_CHUNK_LEN,
            format_tag: PCM_FORMAT_TAG,
            channels: 1,
            sample_rate: 8000,
            byte_rate: 16000,
            block_align: 2,
            bits_per_sample: 16,
            data_size,
            sub_format: None,
        }
    }

    #[test]
    fn test_for_frames_sizes() {
        let header = WavHeader::for_frames(PcmFormat::new(2, BitDepth::Sixteen, 44100), 100).unwrap();

        assert_eq!(header.data_size(), 2 * 100 * 2);
        assert_eq!(header.riff_size(), 36 + 400);
        assert_eq!(header.block_align(), 4);
        assert_eq!(header.byte_rate(), 44100 * 4);
        assert_eq!(header.fmt_size(), 16);
        assert_eq!(header.format_tag(), 1);
        assert_eq!(header.frame_count(), 100);
        assert_eq!(header.sample_count(), 200);
    }

    #[test]
    fn test_for_frames_rejects_overflow() {
        let format = PcmFormat::new(2, BitDepth::Sixteen, 44100);
        let result = WavHeader::for_frames(format, u32::MAX as usize);
        assert!(matches!(result, Err(ConvolvoError::InvalidArgument { .. })));
    }

    #[test]
    fn test_from_raw_accepts_canonical() {
        let header = WavHeader::from_raw(raw_mono_16(10)).unwrap();
        assert_eq!(header.bit_depth(), BitDepth::Sixteen);
        assert_eq!(header.sample_count(), 5);
    }

    #[test]
    fn test_from_raw_rejects_partial_frame() {
        let result = WavHeader::from_raw(raw_mono_16(7));
        assert!(matches!(result, Err(ConvolvoError::MalformedWav { .. })));
    }

    #[test]
    fn test_from_raw_rejects_unsupported_depth() {
        let mut raw = raw_mono_16(12);
        raw.bits_per_sample = 24;
        raw.block_align = 3;
        let result = WavHeader::from_raw(raw);
        assert!(matches!(result, Err(ConvolvoError::MalformedWav { .. })));
    }

    #[test]
    fn test_from_raw_rejects_inconsistent_block_align() {
        let mut raw = raw_mono_16(8);
        raw.block_align = 4;
        assert!(WavHeader::from_raw(raw).is_err());
    }

    #[test]
    fn test_from_raw_rejects_compressed_format() {
        let mut raw = raw_mono_16(8);
        raw.format_tag = 3;
        assert!(WavHeader::from_raw(raw).is_err());
    }

    #[test]
    fn test_from_raw_accepts_extensible_pcm() {
        let mut raw = raw_mono_16(8);
        raw.format_tag = EXTENSIBLE_FORMAT_TAG;
        raw.fmt_size = EXTENSIBLE_FMT_LEN;
        raw.sub_format = Some(PCM_FORMAT_TAG);

        let header = WavHeader::from_raw(raw).unwrap();
        assert_eq!(header.format_tag(), EXTENSIBLE_FORMAT_TAG);
        assert_eq!(header.sample_count(), 4);
    }

    #[test]
    fn test_from_raw_rejects_extensible_float() {
        let mut raw = raw_mono_16(8);
        raw.format_tag = EXTENSIBLE_FORMAT_TAG;
        raw.sub_format = Some(3);
        assert!(WavHeader::from_raw(raw).is_err());

        // Without a subformat the tag alone is not enough
        raw.sub_format = None;
        assert!(WavHeader::from_raw(raw).is_err());
    }

    #[test]
    fn test_bit_depth_ranges() {
        assert_eq!(BitDepth::Eight.sample_range(), (0, 255));
        assert_eq!(BitDepth::Sixteen.sample_range(), (-32768, 32767));
        assert_eq!(BitDepth::from_bits(8).unwrap().bytes(), 1);
        assert!(BitDepth::from_bits(32).is_err());
    }
}
