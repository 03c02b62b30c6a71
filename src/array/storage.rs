//! Backing file, active mapping and capacity bookkeeping.
//!
//! The mapping always covers the whole file, header included. It is dropped before every length
//! change and recreated afterwards; it is never resized in place. A header-only file (capacity 0)
//! has no mapping at all.

use std::fs::File;

use memmap2::{MmapMut, MmapOptions};

use crate::constants::HEADER_SIZE;
use crate::element::Encoding;
use crate::error::{ArrayFileError, Result};
use crate::io::capacity::{CapacityPlan, elements_covering, exact_file_size};
use crate::io::header::HeaderCodec;
use crate::types::Header;

pub(crate) struct Storage {
    file: Option<File>,
    mmap: Option<MmapMut>,
    encoding: Encoding,
    element_size: usize,
    pub(crate) len: usize,
    pub(crate) capacity: usize,
    capacity_bytes: u64,
}

impl Storage {
    /// Initialise a freshly created (empty) file: size it for `initial_capacity` elements and
    /// write a zero-length header.
    pub(crate) fn create(
        mut file: File,
        encoding: Encoding,
        initial_capacity: usize,
    ) -> Result<Self> {
        let plan = CapacityPlan::for_elements(initial_capacity, encoding.element_size())?;
        file.set_len(plan.file_size)?;
        HeaderCodec::write(&mut file, &Header::new(&encoding, 0))?;

        let mut storage = Self::unmapped(file, encoding, 0);
        storage.install(plan)?;
        Ok(storage)
    }

    /// Validate the header of an existing file and map it.
    pub(crate) fn open(mut file: File, encoding: Encoding) -> Result<Self> {
        let header = HeaderCodec::read(&mut file)?.ok_or(ArrayFileError::InvalidHeader {
            reason: "file shorter than header".into(),
        })?;
        header.ensure_compatible(&encoding)?;

        let len = usize::try_from(header.length).map_err(|_| ArrayFileError::InvalidHeader {
            reason: "stored length not addressable".into(),
        })?;
        let file_size = file.metadata()?.len();
        let present = CapacityPlan::for_file_size(file_size, encoding.element_size()).capacity;
        if len > present {
            return Err(ArrayFileError::InvalidHeader {
                reason: format!(
                    "stored length {len} exceeds the {present} elements present in the file"
                )
                .into(),
            });
        }
        let plan = CapacityPlan::for_elements(
            elements_covering(file_size, encoding.element_size()),
            encoding.element_size(),
        )?;

        file.set_len(plan.file_size)?;
        let mut storage = Self::unmapped(file, encoding, len);
        storage.install(plan)?;
        Ok(storage)
    }

    fn unmapped(file: File, encoding: Encoding, len: usize) -> Self {
        Self {
            file: Some(file),
            mmap: None,
            element_size: encoding.element_size(),
            encoding,
            len,
            capacity: 0,
            capacity_bytes: 0,
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(ArrayFileError::Closed);
        }
        Ok(())
    }

    /// Grow so at least `min_elements` fit. Never shrinks.
    pub(crate) fn ensure_capacity(&mut self, min_elements: usize) -> Result<()> {
        if min_elements <= self.capacity && self.mmap.is_some() {
            return Ok(());
        }
        let plan =
            CapacityPlan::for_elements(min_elements.max(self.capacity), self.element_size)?;
        tracing::debug!(
            array.len = self.len,
            array.capacity = self.capacity,
            array.new_capacity = plan.capacity,
            array.file_size = plan.file_size,
            "array grow"
        );
        self.resize(plan)
    }

    /// Drop to zero length and zero capacity, leaving a header-only file.
    pub(crate) fn clear(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.resize(CapacityPlan::EMPTY)?;
        self.len = 0;
        let header = Header::new(&self.encoding, 0);
        if let Some(file) = self.file.as_mut() {
            HeaderCodec::write(file, &header)?;
        }
        tracing::debug!("array cleared");
        Ok(())
    }

    /// Plan describing the file as it is currently sized and mapped.
    fn current_plan(&self) -> CapacityPlan {
        CapacityPlan {
            file_size: HEADER_SIZE as u64 + self.capacity_bytes,
            capacity_bytes: self.capacity_bytes,
            capacity: self.capacity,
        }
    }

    /// Unmap, set the file length, then remap if there is a data region.
    ///
    /// On failure the previous size and mapping are restored before the error is returned, so
    /// the existing elements stay readable and writable.
    fn resize(&mut self, plan: CapacityPlan) -> Result<()> {
        let previous = self.current_plan();
        self.mmap = None;
        let Err(err) = self.set_file_len(plan.file_size).and_then(|()| self.install(plan)) else {
            return Ok(());
        };
        tracing::warn!(
            error = %err,
            array.file_size = plan.file_size,
            "array resize failed"
        );
        if let Err(restore_err) = self.restore(previous) {
            tracing::warn!(error = %restore_err, "array remap after failed resize failed");
        }
        Err(err)
    }

    fn restore(&mut self, plan: CapacityPlan) -> Result<()> {
        self.set_file_len(plan.file_size)?;
        self.install(plan)
    }

    fn set_file_len(&self, size: u64) -> Result<()> {
        let file = self.file.as_ref().ok_or(ArrayFileError::Closed)?;
        file.set_len(size)?;
        Ok(())
    }

    /// Map `plan.file_size` bytes; capacity is only updated once the mapping exists.
    fn install(&mut self, plan: CapacityPlan) -> Result<()> {
        if plan.capacity_bytes == 0 {
            self.mmap = None;
        } else {
            let file = self.file.as_ref().ok_or(ArrayFileError::Closed)?;
            let len =
                usize::try_from(plan.file_size).map_err(|_| ArrayFileError::CapacityOverflow {
                    elements: plan.capacity,
                })?;
            // Safety: the mapping is owned by this storage, which also owns the handle used for
            // every resize, and it is dropped before each length change.
            let mmap = unsafe { MmapOptions::new().len(len).map_mut(file)? };
            tracing::trace!(array.mapped_bytes = len, "array remapped");
            self.mmap = Some(mmap);
        }
        self.capacity = plan.capacity;
        self.capacity_bytes = plan.capacity_bytes;
        Ok(())
    }

    fn byte_range(&self, first: usize, count: usize) -> std::ops::Range<usize> {
        let start = HEADER_SIZE + first * self.element_size;
        start..start + count * self.element_size
    }

    /// Raw bytes of elements `[first, first + count)`; the range must lie within capacity.
    pub(crate) fn elements(&self, first: usize, count: usize) -> Result<&[u8]> {
        let range = self.byte_range(first, count);
        let mmap = self.mmap.as_ref().ok_or(ArrayFileError::NotMapped)?;
        mmap.get(range).ok_or(ArrayFileError::NotMapped)
    }

    pub(crate) fn elements_mut(&mut self, first: usize, count: usize) -> Result<&mut [u8]> {
        let range = self.byte_range(first, count);
        let mmap = self.mmap.as_mut().ok_or(ArrayFileError::NotMapped)?;
        mmap.get_mut(range).ok_or(ArrayFileError::NotMapped)
    }

    /// Copy the first `block` elements into the `times - 1` regions that follow them.
    /// Source and destinations never overlap.
    pub(crate) fn tile(&mut self, block: usize, times: usize) -> Result<()> {
        if block == 0 || times < 2 {
            return Ok(());
        }
        let block_bytes = block * self.element_size;
        let region = self.elements_mut(0, block * times)?;
        for tile in 1..times {
            region.copy_within(0..block_bytes, tile * block_bytes);
        }
        Ok(())
    }

    /// Write back dirty pages and record the current length in the header.
    pub(crate) fn flush(&mut self) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        if let Some(mmap) = self.mmap.as_ref() {
            mmap.flush()?;
        }
        HeaderCodec::write(file, &Header::new(&self.encoding, self.len as u64))?;
        file.sync_data()?;
        Ok(())
    }

    /// Flush, rewrite the header with the final length, truncate to exactly the stored data and
    /// release the handle. A second call does nothing.
    ///
    /// The handle is only released once every step succeeded; after a failure the array stays
    /// open and `close` (or drop) can be retried.
    pub(crate) fn close(&mut self) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        if let Some(mmap) = self.mmap.as_ref() {
            mmap.flush()?;
        }
        HeaderCodec::write(file, &Header::new(&self.encoding, self.len as u64))?;
        let exact = exact_file_size(self.len, self.element_size)?;
        if file.metadata()?.len() > exact {
            let current = self.current_plan();
            self.mmap = None;
            if let Err(err) = self.set_file_len(exact) {
                if let Err(restore_err) = self.install(current) {
                    tracing::warn!(error = %restore_err, "array remap after failed close failed");
                }
                return Err(err);
            }
        }
        if let Some(file) = self.file.as_ref() {
            file.sync_all()?;
        }

        self.file = None;
        self.mmap = None;
        self.capacity = self.len;
        self.capacity_bytes = exact - HEADER_SIZE as u64;
        tracing::debug!(
            array.len = self.len,
            array.file_size = exact,
            "array closed"
        );
        Ok(())
    }
}
