//! Chunk-aligned capacity arithmetic.
//!
//! Growth is exact-need rounded up to the next [`CHUNK_SIZE_BYTES`] boundary, never geometric.
//! Appending one element at a time therefore remaps once per chunk crossed; callers with a batch
//! should use `extend` or `repeat`, which grow once for the whole batch.

use crate::constants::{CHUNK_SIZE_BYTES, HEADER_SIZE};
use crate::error::{ArrayFileError, Result};

/// Capacity of a file after a resize, in both bytes and elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPlan {
    pub file_size: u64,
    pub capacity_bytes: u64,
    pub capacity: usize,
}

impl CapacityPlan {
    /// Header-only file: no data region, nothing to map.
    pub const EMPTY: Self = Self {
        file_size: HEADER_SIZE as u64,
        capacity_bytes: 0,
        capacity: 0,
    };

    /// Smallest chunk-aligned file holding at least `min_elements`.
    pub fn for_elements(min_elements: usize, element_size: usize) -> Result<Self> {
        let overflow = || ArrayFileError::CapacityOverflow {
            elements: min_elements,
        };
        let data_bytes = (min_elements as u64)
            .checked_mul(element_size as u64)
            .ok_or_else(overflow)?;
        let bytes_needed = data_bytes
            .checked_add(HEADER_SIZE as u64)
            .ok_or_else(overflow)?;
        let file_size = bytes_needed
            .div_ceil(CHUNK_SIZE_BYTES)
            .checked_mul(CHUNK_SIZE_BYTES)
            .ok_or_else(overflow)?;
        // The whole file is mapped, so it must be addressable.
        usize::try_from(file_size).map_err(|_| overflow())?;
        Ok(Self::for_file_size(file_size, element_size))
    }

    /// Capacity implied by an existing file length.
    #[must_use]
    pub fn for_file_size(file_size: u64, element_size: usize) -> Self {
        let capacity_bytes = file_size.saturating_sub(HEADER_SIZE as u64);
        #[allow(clippy::cast_possible_truncation)]
        let capacity = (capacity_bytes / element_size as u64) as usize;
        Self {
            file_size,
            capacity_bytes,
            capacity,
        }
    }
}

/// File size after close: header plus exactly `len` elements, no padding.
pub fn exact_file_size(len: usize, element_size: usize) -> Result<u64> {
    (len as u64)
        .checked_mul(element_size as u64)
        .and_then(|bytes| bytes.checked_add(HEADER_SIZE as u64))
        .ok_or(ArrayFileError::CapacityOverflow { elements: len })
}

/// Minimum element count whose storage covers every data byte already in a file of `file_size`.
#[must_use]
pub fn elements_covering(file_size: u64, element_size: usize) -> usize {
    let data = file_size.saturating_sub(HEADER_SIZE as u64);
    #[allow(clippy::cast_possible_truncation)]
    let elements = data.div_ceil(element_size as u64) as usize;
    elements
}
