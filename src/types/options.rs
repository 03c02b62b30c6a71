//! Builder-style options used when opening or creating an array file.

use serde::{Deserialize, Serialize};

/// How the backing file is treated at open time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    /// Create the file, truncating any existing content.
    Create,
    /// Open an existing file; it must exist and carry a valid header.
    Open,
    /// Open and validate the file if it exists, otherwise create it.
    #[default]
    OpenOrCreate,
}

/// Tunable options for opening an array file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayOptions {
    #[serde(default)]
    pub mode: OpenMode,
    /// Minimum element capacity reserved when a file is created. Ignored when an existing
    /// file is opened. Rounded up to the chunk boundary.
    #[serde(default)]
    pub initial_capacity: usize,
}

impl ArrayOptions {
    /// Start a fluent builder for `ArrayOptions`.
    #[must_use]
    pub fn builder() -> ArrayOptionsBuilder {
        ArrayOptionsBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArrayOptionsBuilder {
    inner: ArrayOptions,
}

impl ArrayOptionsBuilder {
    #[must_use]
    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.inner.mode = mode;
        self
    }

    #[must_use]
    pub fn initial_capacity(mut self, elements: usize) -> Self {
        self.inner.initial_capacity = elements;
        self
    }

    #[must_use]
    pub fn build(self) -> ArrayOptions {
        self.inner
    }
}
