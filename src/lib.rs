#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(
        clippy::cast_possible_truncation,
        clippy::float_cmp,
        clippy::uninlined_format_args
    )
)]
#![allow(clippy::module_name_repetitions)]
//
// Documentation lints: internal helpers are self-describing; public APIs still carry docs.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Cast safety: offsets are bounded by the mapped file size, which is checked to fit in `usize`
// before any mapping is created.
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
//
// `len` is exposed alongside `is_empty`, but index types elsewhere don't need both.
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::unreadable_literal)] // Magic numbers in binary formats are clearer as hex

//! Persistent, memory-mapped, growable arrays of fixed-width elements.
//!
//! An array file is a 32-byte header followed by densely packed elements. The file is mapped
//! into memory, so indexed reads and writes are plain memory accesses, and capacity grows in
//! 4096-byte chunks.
//!
//! ```no_run
//! use arrayfile::ArrayFile;
//!
//! # fn main() -> arrayfile::Result<()> {
//! let readings = ArrayFile::<f64>::create("readings.ary")?;
//! readings.extend([20.5, 21.0, 21.25])?;
//! readings.append(22.0)?;
//! assert_eq!(readings.get(-1)?, 22.0);
//! readings.close()?;
//!
//! let readings = ArrayFile::<f64>::open("readings.ary")?;
//! assert_eq!(readings.len(), 4);
//! # Ok(())
//! # }
//! ```

/// The arrayfile crate version (matches `Cargo.toml`).
pub const ARRAYFILE_VERSION: &str = env!("CARGO_PKG_VERSION");

mod array;
pub mod constants;
pub mod element;
pub mod error;
pub mod io;
pub mod types;

pub use array::{ArrayFile, Iter, inspect};
pub use constants::*;
pub use element::{Element, Encoding};
pub use error::{ArrayFileError, Result};
pub use types::{ArrayOptions, ArrayOptionsBuilder, Header, OpenMode, Outcome};
