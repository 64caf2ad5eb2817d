//! Compression seam between the wire format and the bzip2 primitive.
//!
//! # Contract
//! The wire format records a decoded and an encoded length for the container
//! body and for each entry; compression was applied iff the two differ.  The
//! [`Codec`] trait is the whole interface the format needs: one-shot
//! `compress`, and `decompress` that must produce exactly the declared number
//! of bytes or fail.
//!
//! # Framing
//! Compressed data is stored **headerless**: the stream magic is stripped
//! after compression and restored before decompression.  The block size is
//! pinned to 1 so the stripped magic is always the same four bytes (`BZh1`)
//! and never needs to be recorded.

use std::io::Read;

use bzip2::read::{BzDecoder, BzEncoder};
use bzip2::Compression;
use thiserror::Error;

/// The bzip2 stream magic implied by every stored payload.
const STREAM_MAGIC: &[u8; 4] = b"BZh1";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Compression error: {0}")]
    Compression(String),
    #[error("Decompression error: {0}")]
    Decompression(String),
}

pub trait Codec: Send + Sync {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Inflate `data` into exactly `decoded_len` bytes.
    ///
    /// A malformed stream, or one that inflates to any other length, is an
    /// error: the caller trusts the declared length for layout decisions and
    /// must never see a partial payload.
    fn decompress(&self, data: &[u8], decoded_len: usize) -> Result<Vec<u8>, CodecError>;
}

/// The format's native codec: headerless bzip2, block size 1.
pub struct Bzip2Codec;

impl Codec for Bzip2Codec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut compressed = Vec::new();
        BzEncoder::new(data, Compression::new(1))
            .read_to_end(&mut compressed)
            .map_err(|e| CodecError::Compression(e.to_string()))?;

        // Strip the magic; the reader knows to put it back.
        Ok(compressed.split_off(STREAM_MAGIC.len()))
    }

    fn decompress(&self, data: &[u8], decoded_len: usize) -> Result<Vec<u8>, CodecError> {
        let mut framed = Vec::with_capacity(STREAM_MAGIC.len() + data.len());
        framed.extend_from_slice(STREAM_MAGIC);
        framed.extend_from_slice(data);

        let mut decompressed = Vec::with_capacity(decoded_len);
        BzDecoder::new(framed.as_slice())
            .read_to_end(&mut decompressed)
            .map_err(|e| CodecError::Decompression(e.to_string()))?;

        if decompressed.len() != decoded_len {
            return Err(CodecError::Decompression(format!(
                "expected {decoded_len} decoded bytes, got {}",
                decompressed.len()
            )));
        }
        Ok(decompressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_is_headerless() {
        let data = b"compressible compressible compressible compressible";
        let packed = Bzip2Codec.compress(data).unwrap();

        // The stored form must not begin with the stream magic.
        assert_ne!(&packed[..4], STREAM_MAGIC);

        let unpacked = Bzip2Codec.decompress(&packed, data.len()).unwrap();
        assert_eq!(unpacked, data);
    }

    #[test]
    fn wrong_declared_length_is_rejected() {
        let packed = Bzip2Codec.compress(b"four").unwrap();
        assert!(matches!(
            Bzip2Codec.decompress(&packed, 5),
            Err(CodecError::Decompression(_))
        ));
    }

    #[test]
    fn garbage_input_is_rejected() {
        assert!(Bzip2Codec.decompress(&[0xde, 0xad, 0xbe, 0xef], 16).is_err());
    }
}
