//! Mutations. Every method here holds the exclusive lock for its full duration.

use smallvec::{SmallVec, smallvec};

use super::{ArrayFile, normalize_index};
use crate::element::Element;
use crate::error::{ArrayFileError, Result};
use crate::types::Outcome;

/// Encode into a scratch buffer so a rejected value never touches mapped memory.
fn encode_value<T: Element>(value: &T) -> Result<SmallVec<[u8; 16]>> {
    let mut buf: SmallVec<[u8; 16]> = smallvec![0u8; T::SIZE];
    value.encode(&mut buf)?;
    Ok(buf)
}

impl<T: Element> ArrayFile<T> {
    /// Overwrite the element at `index`; negative indices count from the end. Never resizes.
    pub fn set(&self, index: isize, value: T) -> Result<()> {
        let mut state = self.write_state()?;
        state.ensure_open()?;
        let position = normalize_index(index, state.len)?;
        let encoded = encode_value(&value)?;
        state.elements_mut(position, 1)?.copy_from_slice(&encoded);
        Ok(())
    }

    /// Append one element, growing by one chunk-rounded step when full.
    pub fn append(&self, value: T) -> Result<()> {
        let encoded = encode_value(&value)?;
        let mut state = self.write_state()?;
        state.ensure_open()?;
        let position = state.len;
        if position == state.capacity {
            let needed = position
                .checked_add(1)
                .ok_or(ArrayFileError::CapacityOverflow { elements: position })?;
            state.ensure_capacity(needed)?;
        }
        state.elements_mut(position, 1)?.copy_from_slice(&encoded);
        state.len = position + 1;
        Ok(())
    }

    /// Append every value, growing at most once for the whole batch.
    ///
    /// If any value fails to encode the length is left unchanged, so none of the batch becomes
    /// visible. Capacity reserved for the batch is kept.
    pub fn extend<I: IntoIterator<Item = T>>(&self, values: I) -> Result<()> {
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            return Ok(());
        }
        let mut state = self.write_state()?;
        state.ensure_open()?;
        let start = state.len;
        let new_len = start
            .checked_add(values.len())
            .ok_or(ArrayFileError::CapacityOverflow { elements: start })?;
        if new_len > state.capacity {
            state.ensure_capacity(new_len)?;
        }
        let region = state.elements_mut(start, values.len())?;
        for (value, slot) in values.iter().zip(region.chunks_exact_mut(T::SIZE)) {
            value.encode(slot)?;
        }
        state.len = new_len;
        Ok(())
    }

    /// In-place concatenation; any iterable of `T` is accepted, so this always delegates to
    /// [`ArrayFile::extend`].
    pub fn concat_extend<I: IntoIterator<Item = T>>(&self, other: I) -> Result<()> {
        self.extend(other)
    }

    /// Tile the current contents `n` times in place.
    ///
    /// - `n == 0` clears the array to zero length and zero capacity (see [`ArrayFile::clear`]).
    /// - `n == 1` leaves it unchanged.
    /// - `n > 1` grows once, then copies the original block into the `n - 1` regions after it.
    /// - `n < 0` is outside the operation's domain: returns [`Outcome::Unsupported`] and changes
    ///   nothing.
    pub fn repeat(&self, n: i64) -> Result<Outcome> {
        let Ok(times) = usize::try_from(n) else {
            return Ok(Outcome::Unsupported);
        };
        let mut state = self.write_state()?;
        state.ensure_open()?;
        match times {
            0 => state.clear()?,
            1 => {}
            _ => {
                let block = state.len;
                let new_len = block
                    .checked_mul(times)
                    .ok_or(ArrayFileError::CapacityOverflow { elements: block })?;
                if new_len > state.capacity {
                    state.ensure_capacity(new_len)?;
                }
                state.tile(block, times)?;
                state.len = new_len;
            }
        }
        Ok(Outcome::Applied)
    }

    /// Drop every element and release all capacity: the backing file shrinks to the bare header
    /// and the mapping is released. The next append grows it again.
    pub fn clear(&self) -> Result<()> {
        self.write_state()?.clear()
    }
}
