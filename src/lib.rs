pub mod archive;
pub mod buffer;
pub mod codec;
pub mod hash;
pub mod wire;

pub use archive::{Archive, Entry};
pub use buffer::Buffer;
pub use codec::{Bzip2Codec, Codec, CodecError};
pub use hash::encode_entry_name;
pub use wire::{decode, encode, WireError};
