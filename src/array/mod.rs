//! Core `ArrayFile` type: a persistent, memory-mapped, growable array of fixed-width elements.
//!
//! Elements live at `HEADER_SIZE + index * T::SIZE` inside a single file. Capacity grows in
//! 4096-byte chunks, the whole file is mapped, and every access goes straight to mapped memory.
//!
//! All state sits behind one `RwLock`: reads (`get`, `contains`, iteration, `to_vec`) share it,
//! while every mutation, remap, `flush` and `close` holds it exclusively. An `ArrayFile` can
//! therefore be shared across threads (e.g. in an `Arc`) without readers ever observing a mapping
//! that is being replaced.

mod access;
mod lifecycle;
mod mutation;
mod storage;

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tempfile::TempPath;

use crate::element::{Element, Encoding};
use crate::error::{ArrayFileError, Result};

pub use access::Iter;
pub use lifecycle::inspect;

use storage::Storage;

/// Handle to an open array file.
///
/// Call [`ArrayFile::close`] to make the final length durable and trim unused capacity. Dropping
/// an unclosed handle performs the same steps on a best-effort basis and only logs failures.
pub struct ArrayFile<T: Element> {
    pub(crate) state: RwLock<Storage>,
    pub(crate) encoding: Encoding,
    pub(crate) path: PathBuf,
    /// Present for arrays created by [`ArrayFile::temporary`]; removes the file on drop.
    pub(crate) temp_path: Option<TempPath>,
    _element: PhantomData<fn() -> T>,
}

impl<T: Element> ArrayFile<T> {
    fn from_parts(
        storage: Storage,
        encoding: Encoding,
        path: PathBuf,
        temp_path: Option<TempPath>,
    ) -> Self {
        Self {
            state: RwLock::new(storage),
            encoding,
            path,
            temp_path,
            _element: PhantomData,
        }
    }

    pub(crate) fn read_state(&self) -> Result<RwLockReadGuard<'_, Storage>> {
        self.state
            .read()
            .map_err(|err| ArrayFileError::Lock(err.to_string()))
    }

    pub(crate) fn write_state(&self) -> Result<RwLockWriteGuard<'_, Storage>> {
        self.state
            .write()
            .map_err(|err| ArrayFileError::Lock(err.to_string()))
    }

    /// Read guard for infallible accessors; counters stay meaningful after a panic elsewhere.
    fn peek(&self) -> RwLockReadGuard<'_, Storage> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of elements currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.peek().len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements that fit before the next grow.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.peek().capacity
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.peek().is_closed()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.temp_path.is_some()
    }
}

impl<T: Element> fmt::Debug for ArrayFile<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.peek();
        f.debug_struct("ArrayFile")
            .field("path", &self.path)
            .field("encoding", &self.encoding.descriptor())
            .field("len", &state.len)
            .field("capacity", &state.capacity)
            .field("closed", &state.is_closed())
            .finish()
    }
}

/// Resolve a possibly negative index against `len`.
pub(crate) fn normalize_index(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index as usize)
    };
    match resolved {
        Some(position) if position < len => Ok(position),
        _ => Err(ArrayFileError::IndexOutOfRange { index, len }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_indices_count_from_end() {
        assert_eq!(normalize_index(-1, 5).unwrap(), 4);
        assert_eq!(normalize_index(-5, 5).unwrap(), 0);
        assert_eq!(normalize_index(0, 5).unwrap(), 0);
        assert_eq!(normalize_index(4, 5).unwrap(), 4);
    }

    #[test]
    fn out_of_range_indices_rejected() {
        for (index, len) in [(5, 5), (-6, 5), (0, 0), (-1, 0), (isize::MIN, 3), (isize::MAX, 3)] {
            match normalize_index(index, len) {
                Err(ArrayFileError::IndexOutOfRange { index: i, len: l }) => {
                    assert_eq!((i, l), (index, len));
                }
                other => panic!("unexpected result for {index}/{len}: {other:?}"),
            }
        }
    }

    #[test]
    fn array_file_is_send_and_sync() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<ArrayFile<i32>>();
        assert_send_sync::<ArrayFile<[u8; 32]>>();
    }
}
