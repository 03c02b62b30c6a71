//! Creating, opening and closing array files.
//!
//! Responsibilities:
//! - Resolve the open mode into create-or-validate.
//! - Size new files to the requested initial capacity and write a zero-length header.
//! - Validate headers of existing files against the caller's element encoding.
//! - Make the final length durable on close (explicit, or best-effort on drop).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::PoisonError;

use tempfile::NamedTempFile;

use super::ArrayFile;
use super::storage::Storage;
use crate::element::Element;
use crate::error::{ArrayFileError, Result};
use crate::io::header::HeaderCodec;
use crate::types::{ArrayOptions, Header, OpenMode};

impl<T: Element> ArrayFile<T> {
    /// Create a new, empty array at `path`, truncating any existing file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ArrayOptions::builder().mode(OpenMode::Create).build())
    }

    /// Open an existing array. Fails if the file is missing, is not an array file, or was
    /// written with a different element encoding.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ArrayOptions::builder().mode(OpenMode::Open).build())
    }

    /// Open `path` if it exists, otherwise create it.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ArrayOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: ArrayOptions) -> Result<Self> {
        let path_ref = path.as_ref();
        let encoding = T::encoding()?;

        let create = match options.mode {
            OpenMode::Create => true,
            OpenMode::Open => false,
            OpenMode::OpenOrCreate => !path_ref.exists(),
        };

        let storage = if create {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(path_ref)?;
            Storage::create(file, encoding.clone(), options.initial_capacity)?
        } else {
            let file = OpenOptions::new().read(true).write(true).open(path_ref)?;
            Storage::open(file, encoding.clone())?
        };

        tracing::debug!(
            array.path = %path_ref.display(),
            array.encoding = encoding.descriptor(),
            array.created = create,
            array.len = storage.len,
            array.capacity = storage.capacity,
            "array opened"
        );
        Ok(Self::from_parts(storage, encoding, path_ref.to_path_buf(), None))
    }

    /// Create an array backed by a private temporary file, deleted when the handle is dropped.
    pub fn temporary() -> Result<Self> {
        Self::temporary_with(ArrayOptions::default())
    }

    /// Like [`ArrayFile::temporary`]; only `initial_capacity` is honoured, the file is always new.
    pub fn temporary_with(options: ArrayOptions) -> Result<Self> {
        let encoding = T::encoding()?;
        let (file, temp_path) = NamedTempFile::new()?.into_parts();
        let storage = Storage::create(file, encoding.clone(), options.initial_capacity)?;
        let path = temp_path.to_path_buf();
        tracing::debug!(
            array.path = %path.display(),
            array.encoding = encoding.descriptor(),
            array.capacity = storage.capacity,
            "temporary array created"
        );
        Ok(Self::from_parts(storage, encoding, path, Some(temp_path)))
    }

    /// Write dirty mapped pages back to the file and record the current length in the header,
    /// without closing. A flushed array reopens with its flushed length even if it is never
    /// closed. No-op after close.
    pub fn flush(&self) -> Result<()> {
        self.write_state()?.flush()
    }

    /// Flush, persist the final length in the header, trim the file to exactly
    /// `HEADER_SIZE + len * T::SIZE` bytes and release the handle.
    ///
    /// Closing twice is a no-op. After close, `len` still reports the final length, reads fail
    /// with `NotMapped` and mutations fail with `Closed`.
    pub fn close(&self) -> Result<()> {
        self.write_state()?.close()
    }
}

impl<T: Element> Drop for ArrayFile<T> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if state.is_closed() {
            return;
        }
        if let Err(err) = state.close() {
            tracing::warn!(
                array.path = %self.path.display(),
                error = %err,
                "array close on drop failed"
            );
        }
    }
}

/// Read and validate the header of an array file without knowing its element type.
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<Header> {
    let mut file = OpenOptions::new().read(true).open(path.as_ref())?;
    HeaderCodec::read(&mut file)?.ok_or(ArrayFileError::InvalidHeader {
        reason: "file shorter than header".into(),
    })
}
