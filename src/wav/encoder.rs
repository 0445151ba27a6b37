//! WAV encoding
//!
//! Serializes integer samples behind a canonical 44-byte PCM header. Every
//! multi-byte field is written least-significant byte first.

use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use log::debug;
use tempfile::NamedTempFile;

use crate::error::{ConvolvoError, Result};
use crate::wav::header::{BitDepth, PcmFormat, WavHeader, HEADER_LEN};

/// Encodes integer samples as a PCM WAV file in a fixed format
#[derive(Debug, Clone, Copy)]
pub struct WavEncoder {
    format: PcmFormat,
}

impl WavEncoder {
    pub fn new(format: PcmFormat) -> Self {
        WavEncoder { format }
    }

    /// Header describing `samples` interleaved samples in this encoder's format
    ///
    /// A trailing partial frame counts as a whole frame; [`WavEncoder::encode`]
    /// pads it with zeros.
    pub fn header_for(&self, samples: usize) -> Result<WavHeader> {
        let channels = self.format.channels.max(1) as usize;
        WavHeader::for_frames(self.format, samples.div_ceil(channels))
    }

    /// Write the header and samples to `writer`
    ///
    /// # Arguments
    /// * `writer` - Destination for the encoded bytes
    /// * `samples` - Interleaved samples; 8-bit output clamps each sample to 0..=255
    ///
    /// # Returns
    /// The header that was written
    pub fn encode<W: Write>(&self, writer: &mut W, samples: &[i16]) -> Result<WavHeader> {
        let header = self.header_for(samples.len())?;
        write_header(writer, &header)?;

        let padding = header.sample_count() - samples.len();
        let padded = samples.iter().copied().chain(std::iter::repeat(0).take(padding));

        match header.bit_depth() {
            BitDepth::Eight => {
                for sample in padded {
                    writer.write_u8(sample.clamp(0, u8::MAX as i16) as u8)?;
                }
            }
            BitDepth::Sixteen => {
                for sample in padded {
                    writer.write_i16::<LittleEndian>(sample)?;
                }
            }
        }

        Ok(header)
    }

    /// Encode to an in-memory WAV file
    pub fn encode_to_vec(&self, samples: &[i16]) -> Result<Vec<u8>> {
        let bytes_per_sample = self.format.bit_depth.bytes() as usize;
        let mut buffer = Vec::with_capacity(HEADER_LEN + samples.len() * bytes_per_sample);
        self.encode(&mut buffer, samples)?;
        Ok(buffer)
    }

    /// Encode and write a WAV file atomically
    ///
    /// The file is written to a temporary sibling and renamed over `path`,
    /// so `path` either keeps its previous contents or holds the complete
    /// new file.
    ///
    /// # Errors
    /// * `InvalidArgument` - if the samples do not fit in a WAV data chunk
    /// * `Io` - if the file cannot be written
    pub fn write_wav<P: AsRef<Path>>(&self, path: P, samples: &[i16]) -> Result<WavHeader> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        let header = self.encode(&mut bytes, samples)?;

        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| ConvolvoError::Io(e.error))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(header)
    }
}

/// Write the 44-byte canonical header
pub fn write_header<W: Write>(writer: &mut W, header: &WavHeader) -> Result<()> {
    // RIFF form
    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(header.riff_size())?;
    writer.write_all(b"WAVE")?;

    // fmt chunk (space after 't' is part of the id)
    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(header.fmt_size())?;
    writer.write_u16::<LittleEndian>(header.format_tag())?;
    writer.write_u16::<LittleEndian>(header.channels())?;
    writer.write_u32::<LittleEndian>(header.sample_rate())?;
    writer.write_u32::<LittleEndian>(header.byte_rate())?;
    writer.write_u16::<LittleEndian>(header.block_align())?;
    writer.write_u16::<LittleEndian>(header.bits_per_sample())?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(header.data_size())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::WavDecoder;
    use tempfile::tempdir;

    #[test]
    fn test_header_bytes_are_little_endian() {
        let encoder = WavEncoder::new(PcmFormat::mono_16(8000));
        let bytes = encoder.encode_to_vec(&[1, -2, 3]).unwrap();

        assert_eq!(bytes.len(), 44 + 6);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[4..8], &[42, 0, 0, 0]);
        assert_eq!(&bytes[8..16], b"WAVEfmt ");
        assert_eq!(&bytes[16..20], &[16, 0, 0, 0]);
        assert_eq!(&bytes[20..22], &[1, 0]);
        assert_eq!(&bytes[22..24], &[1, 0]);
        assert_eq!(&bytes[24..28], &[0x40, 0x1F, 0, 0]);
        assert_eq!(&bytes[28..32], &[0x80, 0x3E, 0, 0]);
        assert_eq!(&bytes[32..34], &[2, 0]);
        assert_eq!(&bytes[34..36], &[16, 0]);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(&bytes[40..44], &[6, 0, 0, 0]);
        assert_eq!(&bytes[44..], &[1, 0, 0xFE, 0xFF, 3, 0]);
    }

    #[test]
    fn test_header_round_trip() {
        let cases = [
            (1u16, BitDepth::Sixteen, 8000u32, 5usize),
            (2, BitDepth::Sixteen, 44100, 3),
            (1, BitDepth::Eight, 11025, 7),
            (2, BitDepth::Eight, 22050, 4),
        ];

        for (channels, depth, rate, frames) in cases {
            let encoder = WavEncoder::new(PcmFormat::new(channels, depth, rate));
            let samples = vec![1i16; frames * channels as usize];
            let bytes = encoder.encode_to_vec(&samples).unwrap();

            let decoded = WavDecoder::new().decode(&bytes).unwrap();
            let header = decoded.header();
            assert_eq!(header.channels(), channels);
            assert_eq!(header.bit_depth(), depth);
            assert_eq!(header.sample_rate(), rate);
            assert_eq!(header.frame_count(), frames);
            assert_eq!(
                header.data_size() as usize,
                channels as usize * frames * depth.bytes() as usize
            );
        }
    }

    #[test]
    fn test_partial_frame_is_zero_padded() {
        let encoder = WavEncoder::new(PcmFormat::new(2, BitDepth::Sixteen, 8000));
        let bytes = encoder.encode_to_vec(&[7, 8, 9]).unwrap();

        let decoded = WavDecoder::new().decode(&bytes).unwrap();
        assert_eq!(decoded.samples().as_slice(), &[7, 8, 9, 0]);
        assert_eq!(decoded.header().data_size(), 8);
    }

    #[test]
    fn test_8bit_output_clamps_to_byte_range() {
        let encoder = WavEncoder::new(PcmFormat::new(1, BitDepth::Eight, 8000));
        let bytes = encoder.encode_to_vec(&[-5, 0, 200, 300]).unwrap();
        assert_eq!(&bytes[44..], &[0, 0, 200, 255]);
    }

    #[test]
    fn test_write_wav_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let header = WavEncoder::new(PcmFormat::mono_16(48000))
            .write_wav(&path, &[100, -100])
            .unwrap();
        assert_eq!(header.data_size(), 4);

        let decoded = WavDecoder::new().read_wav(&path).unwrap();
        assert_eq!(decoded.samples().as_slice(), &[100, -100]);

        // Only the output file is left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_wav_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");

        let result = WavEncoder::new(PcmFormat::mono_16(8000)).write_wav(&path, &[1]);
        assert!(matches!(result, Err(ConvolvoError::Io(_))));
        assert!(!path.exists());
    }
}
