//! Wire format decode and encode.
//!
//! # Layout
//! A container is a 6-byte outer header followed by the body.  The first
//! 3 bytes are the body's decoded size, the next 3 its encoded size; when the
//! two differ the body is bzip2-compressed as a whole.  The (decoded) body is:
//!
//! ```text
//! [2B entry_count]
//! entry_count × [4B name_hash][3B decoded_size][3B encoded_size]
//! entry_count × payload bytes, encoded_size each, table order
//! ```
//!
//! Payloads sit contiguously after the table, so the data region starts at a
//! fixed offset computable from the count alone.  An entry whose two declared
//! sizes differ is individually compressed on disk.
//!
//! # Decode
//! [`decode`] is linear and all-or-nothing: any declared length pointing past
//! the available bytes aborts with [`WireError::OutOfBounds`], and codec
//! failures are surfaced verbatim.  No partial archive is ever returned.
//!
//! # Encode
//! [`encode`] never compresses individual entries; both per-entry size
//! fields are written equal.  Whole-body compression is applied when the
//! assembled body reaches the caller's `threshold`.  Re-encoding an archive
//! that arrived with individually compressed entries therefore stores those
//! entries flat; readers accept both forms.

use tracing::debug;

use crate::archive::{Archive, Entry};
use crate::buffer::{Buffer, BufferError};
use crate::codec::{Bzip2Codec, Codec, CodecError};
use thiserror::Error;

/// Bytes per entry-table row: 4B name hash + 3B decoded size + 3B encoded size.
const TABLE_ROW_LEN: usize = 10;

/// Exclusive upper bound for the 3-byte size fields.
const MAX_BLOCK_LEN: usize = 1 << 24;

/// Default body size at which whole-container compression kicks in.  Small
/// bodies are stored flat: below about a kilobyte the bzip2 stream overhead
/// cancels out any savings.
pub const DEFAULT_COMPRESS_THRESHOLD: usize = 1024;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Truncated container: {0}")]
    OutOfBounds(#[from] BufferError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Entry payload of {0} bytes exceeds the 3-byte size field")]
    EntryTooLarge(usize),
    #[error("Container body of {0} bytes exceeds the 3-byte size field")]
    BodyTooLarge(usize),
    #[error("Entry count {0} exceeds the 2-byte table header")]
    TooManyEntries(usize),
}

// ── Decode ───────────────────────────────────────────────────────────────────

/// Parse a container using the format's native bzip2 codec.
pub fn decode(data: &[u8]) -> Result<Archive, WireError> {
    decode_with(data, &Bzip2Codec)
}

/// Parse a container with a caller-supplied codec.
pub fn decode_with(data: &[u8], codec: &dyn Codec) -> Result<Archive, WireError> {
    let mut outer = Buffer::from_vec(data.to_vec());

    let decoded_len = outer.read_uint(3)? as usize;
    let encoded_len = outer.read_uint(3)? as usize;

    debug!(decoded_len, encoded_len, "read container header");

    // Equal sizes mean the body was stored flat; keep parsing in place past
    // the header.  Otherwise everything after the header is one compressed
    // stream and parsing restarts inside its decoded form.
    let body = if decoded_len == encoded_len {
        outer
    } else {
        debug!("decompressing container body");
        Buffer::from_vec(codec.decompress(outer.remaining(), decoded_len)?)
    };

    unpack_entries(body, codec)
}

fn unpack_entries(mut body: Buffer, codec: &dyn Codec) -> Result<Archive, WireError> {
    let entry_count = body.read_uint(2)? as usize;

    // Table rows are fixed-width, so the data region starts right after the
    // last row and each payload advances it by that entry's encoded size.
    let mut data_offset = body.position() + entry_count * TABLE_ROW_LEN;

    debug!(entry_count, data_offset, "unpacking entry table");

    let mut entries = Vec::with_capacity(entry_count);

    for _ in 0..entry_count {
        let name_hash = body.read_uint(4)? as u32;
        let entry_decoded_len = body.read_uint(3)? as usize;
        let entry_encoded_len = body.read_uint(3)? as usize;

        let stored = body.slice_at(data_offset, entry_encoded_len)?;
        let payload = if entry_decoded_len == entry_encoded_len {
            stored.to_vec()
        } else {
            debug!(name_hash, "decompressing entry");
            codec.decompress(stored, entry_decoded_len)?
        };

        debug!(
            name_hash,
            offset = data_offset,
            size = payload.len(),
            "materialized entry"
        );

        data_offset += entry_encoded_len;
        entries.push(Entry { name_hash, payload });
    }

    Ok(Archive::from_entries(entries))
}

// ── Encode ───────────────────────────────────────────────────────────────────

/// Serialize an archive using the format's native bzip2 codec.
pub fn encode(archive: &Archive, threshold: usize) -> Result<Vec<u8>, WireError> {
    encode_with(archive, threshold, &Bzip2Codec)
}

/// Serialize an archive, compressing the whole body once it is at least
/// `threshold` bytes.
pub fn encode_with(
    archive: &Archive,
    threshold: usize,
    codec: &dyn Codec,
) -> Result<Vec<u8>, WireError> {
    let entries = archive.entries();
    if entries.len() > u16::MAX as usize {
        return Err(WireError::TooManyEntries(entries.len()));
    }

    let mut body = Buffer::new();
    body.write_uint(2, entries.len() as u64);

    for entry in entries {
        if entry.payload.len() >= MAX_BLOCK_LEN {
            return Err(WireError::EntryTooLarge(entry.payload.len()));
        }
        body.write_uint(4, u64::from(entry.name_hash));
        // Entries are written flat, so both declared sizes match.
        body.write_uint(3, entry.payload.len() as u64);
        body.write_uint(3, entry.payload.len() as u64);
    }

    for entry in entries {
        body.write_bytes(&entry.payload);
    }

    let body = body.into_inner();
    let decoded_len = body.len();
    if decoded_len >= MAX_BLOCK_LEN {
        return Err(WireError::BodyTooLarge(decoded_len));
    }

    let body = if decoded_len >= threshold {
        debug!(decoded_len, threshold, "compressing container body");
        codec.compress(&body)?
    } else {
        body
    };

    let encoded_len = body.len();
    if encoded_len >= MAX_BLOCK_LEN {
        return Err(WireError::BodyTooLarge(encoded_len));
    }

    debug!(decoded_len, encoded_len, "writing container header");

    let mut out = Buffer::new();
    out.write_uint(3, decoded_len as u64);
    out.write_uint(3, encoded_len as u64);
    out.write_bytes(&body);

    Ok(out.into_inner())
}
