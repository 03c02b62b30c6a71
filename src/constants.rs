//! On-disk format constants for `.ary` array files.

/// Magic tag at offset 0 of every array file.
pub const MAGIC: [u8; 4] = *b"ARYF";

/// The only header version this crate reads or writes.
pub const FORMAT_VERSION: u16 = 1;

/// Fixed header size; element data starts immediately after.
pub const HEADER_SIZE: usize = 32;

/// Allocation granularity. While open, the file length (header included) is a multiple of this.
pub const CHUNK_SIZE_BYTES: u64 = 4096;

/// Width of the zero-padded encoding descriptor slot in the header.
pub const ENCODING_SLOT_LEN: usize = 8;

// Header field offsets (little-endian layout).
pub(crate) const OFFSET_VERSION: usize = 4;
pub(crate) const OFFSET_ENCODING_LEN: usize = 6;
pub(crate) const OFFSET_ENCODING: usize = 7;
pub(crate) const OFFSET_ELEMENT_SIZE: usize = 15;
pub(crate) const OFFSET_LENGTH: usize = 19;
pub(crate) const OFFSET_RESERVED: usize = 27;
