//! Tagged result for operations that only apply to some operands.

/// Whether an in-place operation applied to its operand.
///
/// `Unsupported` is not a failure: it tells the caller the operand is outside the operation's
/// domain (for example a negative repeat count) and nothing was changed, so another code path
/// can be tried. Genuine failures are still reported through [`crate::ArrayFileError`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Unsupported,
}

impl Outcome {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }

    #[must_use]
    pub fn is_unsupported(self) -> bool {
        matches!(self, Self::Unsupported)
    }
}
