//! PCM WAV codec
//!
//! Reads and writes uncompressed 8-bit and 16-bit PCM WAV files with the
//! canonical 44-byte header.

pub mod decoder;
pub mod encoder;
pub mod header;

pub use decoder::{decode_samples, HeaderLayout, WavDecoder};
pub use encoder::{write_header, WavEncoder};
pub use header::{BitDepth, PcmFormat, WavHeader, HEADER_LEN};
