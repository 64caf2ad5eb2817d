//! Byte cursor over the wire format's big-endian integer fields.
//!
//! A [`Buffer`] is either a parse cursor over existing bytes (reads advance
//! `position`, never past the end) or an append-only assembly buffer (writes
//! go to the tail; previously written bytes are never touched).  All
//! multi-byte integers are big-endian; the format's size fields are 2, 3 and
//! 4 bytes wide, so reads go through `byteorder`'s variable-width
//! [`read_uint`](byteorder::ReadBytesExt::read_uint).

use byteorder::{BigEndian, ReadBytesExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("Read of {requested} bytes at offset {offset} exceeds buffer length {len}")]
    OutOfBounds {
        offset:    usize,
        requested: usize,
        len:       usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Buffer {
    data:     Vec<u8>,
    position: usize,
}

impl Buffer {
    /// Empty buffer for assembly; writes append at the tail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse cursor over `data`, starting at offset 0.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    /// Read the next `width` bytes as a big-endian unsigned integer and
    /// advance the cursor.  `width` must be in `1..=8`.
    pub fn read_uint(&mut self, width: usize) -> Result<u64, BufferError> {
        debug_assert!((1..=8).contains(&width));
        let mut slice = self.remaining();
        let value = slice
            .read_uint::<BigEndian>(width)
            .map_err(|_| BufferError::OutOfBounds {
                offset:    self.position,
                requested: width,
                len:       self.data.len(),
            })?;
        self.position += width;
        Ok(value)
    }

    /// Borrow `len` bytes at an absolute `offset` without moving the cursor.
    pub fn slice_at(&self, offset: usize, len: usize) -> Result<&[u8], BufferError> {
        let end = offset.checked_add(len).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => Ok(&self.data[offset..end]),
            None => Err(BufferError::OutOfBounds {
                offset,
                requested: len,
                len: self.data.len(),
            }),
        }
    }

    /// Everything from the cursor to the end of the buffer.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.position..]
    }

    // ── Writes ───────────────────────────────────────────────────────────────

    /// Append `value` as `width` big-endian bytes, most-significant first.
    /// Bits above `width * 8` are discarded; the size fields this is used for
    /// are range-checked by the caller before writing.
    pub fn write_uint(&mut self, width: usize, value: u64) {
        debug_assert!((1..=8).contains(&width));
        self.data.extend_from_slice(&value.to_be_bytes()[8 - width..]);
    }

    /// Append a byte slice verbatim.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn read_advances_by_width() {
        let mut buf = Buffer::from_vec(vec![0x12, 0x34, 0x56, 0x78, 0x9a]);
        assert_eq!(buf.read_uint(2).unwrap(), 0x1234);
        assert_eq!(buf.position(), 2);
        assert_eq!(buf.read_uint(3).unwrap(), 0x56789a);
        assert_eq!(buf.position(), 5);
    }

    #[test]
    fn read_past_end_is_an_error() {
        let mut buf = Buffer::from_vec(vec![0xff, 0xff]);
        assert!(matches!(buf.read_uint(3), Err(BufferError::OutOfBounds { .. })));
        // A failed read must not advance the cursor.
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn write_truncates_high_bits() {
        let mut buf = Buffer::new();
        buf.write_uint(3, 0x0102_0304);
        assert_eq!(buf.as_slice(), &[0x02, 0x03, 0x04]);
    }

    #[test]
    fn slice_at_checks_bounds() {
        let buf = Buffer::from_vec(vec![1, 2, 3, 4]);
        assert_eq!(buf.slice_at(1, 2).unwrap(), &[2, 3]);
        assert!(buf.slice_at(3, 2).is_err());
        assert!(buf.slice_at(usize::MAX, 1).is_err());
    }

    proptest! {
        #[test]
        fn uint_roundtrip(width in 2usize..=4, value in any::<u64>()) {
            let max = (1u64 << (width * 8)) - 1;
            let value = value & max;

            let mut buf = Buffer::new();
            buf.write_uint(width, value);
            prop_assert_eq!(buf.len(), width);

            let mut rd = Buffer::from_vec(buf.into_inner());
            prop_assert_eq!(rd.read_uint(width).unwrap(), value);
        }
    }
}
