//! Decoded form of the 32-byte array file header.

use crate::constants::{FORMAT_VERSION, MAGIC};
use crate::element::Encoding;
use crate::error::{ArrayFileError, Result};

/// Header record stored at offset 0.
///
/// `length` is the logical element count at the time of the last flush (explicit `flush`, `clear`
/// or `close`); between flushes the live length is held in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u16,
    pub encoding: String,
    pub element_size: u32,
    pub length: u64,
}

impl Header {
    #[must_use]
    pub fn new(encoding: &Encoding, length: u64) -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            encoding: encoding.descriptor().to_owned(),
            element_size: encoding.element_size_u32(),
            length,
        }
    }

    /// Reject a header written for a different element layout.
    pub fn ensure_compatible(&self, requested: &Encoding) -> Result<()> {
        if self.encoding != requested.descriptor() {
            return Err(ArrayFileError::EncodingMismatch {
                found: self.encoding.clone(),
                requested: requested.descriptor().to_owned(),
            });
        }
        if self.element_size != requested.element_size_u32() {
            return Err(ArrayFileError::ElementSizeMismatch {
                found: self.element_size,
                expected: requested.element_size_u32(),
            });
        }
        Ok(())
    }
}
