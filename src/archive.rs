//! In-memory [`Archive`] model, the primary embedding surface.
//!
//! ```
//! use jagpack::archive::Archive;
//! use jagpack::wire;
//!
//! let mut ar = Archive::new();
//! ar.put("readme.txt", b"Hello, world!".to_vec());
//!
//! let bytes = wire::encode(&ar, wire::DEFAULT_COMPRESS_THRESHOLD)?;
//! let back = wire::decode(&bytes)?;
//! assert_eq!(back.get("readme.txt"), Some(&b"Hello, world!"[..]));
//! # Ok::<(), jagpack::wire::WireError>(())
//! ```

use tracing::{debug, warn};

use crate::hash::encode_entry_name;

/// One named payload.  The name itself is never stored; [`name_hash`] is the
/// entry's only identity.
///
/// [`name_hash`]: Entry::name_hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name_hash: u32,
    pub payload:   Vec<u8>,
}

/// Ordered entry collection.  Order is meaningful: it fixes both the entry
/// table and the data-region layout when the archive is written back out.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<Entry>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Look up an entry's payload by name.
    ///
    /// Names are hashed before comparison, so lookups are case-insensitive.
    /// When two names collide, the earliest entry in table order wins.
    /// A miss is a normal outcome, not an error.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        let encoded = encode_entry_name(name);

        self.entries
            .iter()
            .find(|entry| entry.name_hash == encoded)
            .map(|entry| entry.payload.as_slice())
    }

    /// Insert `payload` under `name`, replacing in place if an entry with the
    /// same name hash already exists.  The entry count never decreases and
    /// existing order is preserved.
    pub fn put(&mut self, name: &str, payload: Vec<u8>) {
        let encoded = encode_entry_name(name);

        if let Some(entry) = self.entries.iter_mut().find(|e| e.name_hash == encoded) {
            warn!(name, "replaced existing entry in archive");
            entry.payload = payload;
            return;
        }

        debug!(name, hash = encoded, "added new archive entry");
        self.entries.push(Entry {
            name_hash: encoded,
            payload,
        });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
