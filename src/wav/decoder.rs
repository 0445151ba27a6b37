//! WAV decoding
//!
//! Parses a RIFF/WAVE byte stream into a validated [`WavHeader`] and a
//! [`SampleBuffer`]. The default layout reads every field at its fixed
//! canonical offset; files with extra chunks before `data` need
//! [`HeaderLayout::ChunkScan`].

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine::buffer::{DecodedWav, SampleBuffer};
use crate::error::{ConvolvoError, Result};
use crate::wav::header::{
    BitDepth, RawHeader, WavHeader, DATA_ID_OFFSET, DATA_SIZE_OFFSET, EXTENSIBLE_FMT_LEN,
    EXTENSIBLE_FORMAT_TAG, FMT_CHUNK_LEN, FMT_SIZE_OFFSET, FORMAT_TAG_OFFSET, HEADER_LEN,
    RIFF_SIZE_OFFSET, SUB_FORMAT_OFFSET,
};

/// How the decoder locates the `fmt ` fields and the `data` payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderLayout {
    /// Fixed 44-byte header, payload at offset 44
    #[default]
    Canonical,
    /// Walk the RIFF chunk list and find `fmt ` and `data` by id
    ChunkScan,
}

/// Decodes PCM WAV files into integer samples
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder {
    layout: HeaderLayout,
}

impl WavDecoder {
    /// Create a decoder using the canonical fixed-offset layout
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: HeaderLayout) -> Self {
        WavDecoder { layout }
    }

    /// Decode a complete WAV file held in memory
    ///
    /// # Errors
    /// * `MalformedWav` - if the input is shorter than 44 bytes, is not a
    ///   RIFF/WAVE container, has an unsupported bit depth, has a data size
    ///   that is not a whole number of frames, or declares more payload
    ///   than it contains
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedWav> {
        if bytes.len() < HEADER_LEN {
            return Err(ConvolvoError::malformed(format!(
                "{} bytes is shorter than the {}-byte WAV header",
                bytes.len(),
                HEADER_LEN
            )));
        }
        if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(ConvolvoError::malformed("missing RIFF/WAVE signature"));
        }

        let (raw, payload_offset) = match self.layout {
            HeaderLayout::Canonical => read_canonical(bytes)?,
            HeaderLayout::ChunkScan => scan_chunks(bytes)?,
        };
        let header = WavHeader::from_raw(raw)?;

        let available = bytes.len() - payload_offset;
        let data_size = header.data_size() as usize;
        if data_size > available {
            return Err(ConvolvoError::malformed(format!(
                "data chunk declares {} bytes but only {} remain",
                data_size, available
            )));
        }

        let payload = &bytes[payload_offset..payload_offset + data_size];
        let samples = decode_samples(payload, header.bit_depth());

        debug!(
            "Decoded {} samples ({} ch, {} Hz, {}-bit)",
            samples.len(),
            header.channels(),
            header.sample_rate(),
            header.bits_per_sample()
        );

        Ok(DecodedWav::new(header, SampleBuffer::new(samples)))
    }

    /// Read a reader to its end and decode the bytes
    pub fn decode_reader<R: Read>(&self, mut reader: R) -> Result<DecodedWav> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.decode(&bytes)
    }

    /// Load and decode a WAV file
    ///
    /// # Errors
    /// * `FileNotFound` - if the file does not exist
    /// * `Io` - if the file cannot be read
    /// * `MalformedWav` - see [`WavDecoder::decode`]
    pub fn read_wav<P: AsRef<Path>>(&self, path: P) -> Result<DecodedWav> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConvolvoError::FileNotFound {
                path: path.display().to_string(),
                source: Some(e),
            },
            _ => ConvolvoError::Io(e),
        })?;

        debug!("Read {} bytes from {}", bytes.len(), path.display());
        self.decode(&bytes)
    }
}

/// Decode a raw PCM payload at the given bit depth
///
/// 8-bit bytes are widened as unsigned values with no bias removed. 16-bit
/// pairs are read little-endian as two's-complement `i16`.
pub fn decode_samples(payload: &[u8], bit_depth: BitDepth) -> Vec<i16> {
    match bit_depth {
        BitDepth::Eight => payload.iter().map(|&b| i16::from(b)).collect(),
        BitDepth::Sixteen => payload
            .chunks_exact(2)
            .map(LittleEndian::read_i16)
            .collect(),
    }
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn truncated(err: io::Error) -> ConvolvoError {
    ConvolvoError::malformed(format!("header truncated: {}", err))
}

/// Read every header field at its fixed canonical offset
fn read_canonical(bytes: &[u8]) -> Result<(RawHeader, usize)> {
    let mut cursor = Cursor::new(bytes);
    let mut raw = RawHeader::default();

    cursor.set_position(RIFF_SIZE_OFFSET);
    raw.riff_size = cursor.read_u32::<LittleEndian>().map_err(truncated)?;

    cursor.set_position(FMT_SIZE_OFFSET);
    raw.fmt_size = cursor.read_u32::<LittleEndian>().map_err(truncated)?;

    cursor.set_position(FORMAT_TAG_OFFSET);
    read_fmt_fields(&mut cursor, &mut raw)?;

    cursor.set_position(DATA_SIZE_OFFSET);
    raw.data_size = cursor.read_u32::<LittleEndian>().map_err(truncated)?;

    if &bytes[DATA_ID_OFFSET..DATA_ID_OFFSET + 4] != b"data" {
        warn!("No 'data' chunk at offset 36; the file may carry extra chunks (try chunk scanning)");
    }

    Ok((raw, HEADER_LEN))
}

/// `formatTag` through `bitsPerSample`, in file order
fn read_fmt_fields(cursor: &mut Cursor<&[u8]>, raw: &mut RawHeader) -> Result<()> {
    raw.format_tag = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
    raw.channels = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
    raw.sample_rate = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    raw.byte_rate = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    raw.block_align = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
    raw.bits_per_sample = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
    Ok(())
}

/// Walk the RIFF chunk list until the `data` chunk is found
fn scan_chunks(bytes: &[u8]) -> Result<(RawHeader, usize)> {
    let mut raw = RawHeader {
        riff_size: LittleEndian::read_u32(&bytes[4..8]),
        ..RawHeader::default()
    };
    let mut seen_fmt = false;
    let mut pos = 12;

    while pos + 8 <= bytes.len() {
        let chunk_id = &bytes[pos..pos + 4];
        let chunk_size = LittleEndian::read_u32(&bytes[pos + 4..pos + 8]);
        let body = pos + 8;

        match chunk_id {
            b"fmt " => {
                if chunk_size < FMT_CHUNK_LEN {
                    return Err(ConvolvoError::malformed(format!(
                        "fmt chunk is {} bytes, expected at least {}",
                        chunk_size, FMT_CHUNK_LEN
                    )));
                }
                let mut cursor = Cursor::new(bytes);
                cursor.set_position(body as u64);
                raw.fmt_size = chunk_size;
                read_fmt_fields(&mut cursor, &mut raw)?;
                if raw.format_tag == EXTENSIBLE_FORMAT_TAG && chunk_size >= EXTENSIBLE_FMT_LEN {
                    cursor.set_position(body as u64 + SUB_FORMAT_OFFSET);
                    raw.sub_format = Some(cursor.read_u16::<LittleEndian>().map_err(truncated)?);
                }
                seen_fmt = true;
            }
            b"data" => {
                if !seen_fmt {
                    return Err(ConvolvoError::malformed("data chunk precedes fmt chunk"));
                }
                raw.data_size = chunk_size;
                return Ok((raw, body));
            }
            other => {
                debug!(
                    "Skipping '{}' chunk ({} bytes)",
                    String::from_utf8_lossy(other),
                    chunk_size
                );
            }
        }

        // Chunks are word aligned
        let padded = chunk_size as usize + (chunk_size as usize & 1);
        pos = body.saturating_add(padded);
    }

    Err(ConvolvoError::malformed("no data chunk found"))
}
