//! File-level codecs and sizing arithmetic.

pub mod capacity;
pub mod header;
