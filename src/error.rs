//! Error type shared by every array file operation.

use std::borrow::Cow;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ArrayFileError>;

#[derive(Debug, Error)]
pub enum ArrayFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not carry a usable array header.
    #[error("file does not have a valid array header: {reason}")]
    InvalidHeader { reason: Cow<'static, str> },

    /// Magic matched but the header was written by an incompatible format revision.
    #[error("unsupported header version: {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("file encoding '{found}' does not match requested encoding '{requested}'")]
    EncodingMismatch { found: String, requested: String },

    #[error("file element size {found} does not match expected {expected}")]
    ElementSizeMismatch { found: u32, expected: u32 },

    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    /// A value could not be represented in the fixed-width element encoding.
    #[error("value cannot be encoded as '{encoding}': {reason}")]
    Encode {
        encoding: String,
        reason: Cow<'static, str>,
    },

    #[error("invalid encoding descriptor '{descriptor}': {reason}")]
    InvalidEncoding {
        descriptor: String,
        reason: Cow<'static, str>,
    },

    /// Indexed access while no mapping is active (zero capacity, or after close).
    #[error("array is not memory-mapped")]
    NotMapped,

    #[error("array file has been closed")]
    Closed,

    #[error("requested capacity of {elements} elements overflows the addressable file size")]
    CapacityOverflow { elements: usize },

    #[error("lock poisoned: {0}")]
    Lock(String),
}

impl ArrayFileError {
    /// Compatibility errors: the file is an array file, but not one this caller can use.
    #[must_use]
    pub fn is_incompatible(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedVersion { .. }
                | Self::EncodingMismatch { .. }
                | Self::ElementSizeMismatch { .. }
        )
    }
}
