//! Public types exposed by the `arrayfile` crate.

pub mod header;
pub mod options;
pub mod outcome;

pub use header::Header;
pub use options::{ArrayOptions, ArrayOptionsBuilder, OpenMode};
pub use outcome::Outcome;
