//! Read paths: indexed reads, membership and iteration. All take the shared lock.

use std::iter::FusedIterator;

use super::{ArrayFile, normalize_index};
use crate::element::Element;
use crate::error::Result;

impl<T: Element> ArrayFile<T> {
    /// Read the element at `index`; negative indices count from the end.
    pub fn get(&self, index: isize) -> Result<T> {
        let state = self.read_state()?;
        let position = normalize_index(index, state.len)?;
        Ok(T::decode(state.elements(position, 1)?))
    }

    /// Linear scan for `value`.
    pub fn contains(&self, value: &T) -> Result<bool> {
        let state = self.read_state()?;
        if state.len == 0 {
            return Ok(false);
        }
        let found = state
            .elements(0, state.len)?
            .chunks_exact(T::SIZE)
            .any(|bytes| T::decode(bytes) == *value);
        Ok(found)
    }

    /// Decode every element under a single shared lock.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let state = self.read_state()?;
        if state.len == 0 {
            return Ok(Vec::new());
        }
        Ok(state
            .elements(0, state.len)?
            .chunks_exact(T::SIZE)
            .map(T::decode)
            .collect())
    }

    /// Lazy iterator over the elements present right now.
    ///
    /// The upper bound is the length at the time of this call; elements appended later are not
    /// visited. Each step takes the shared lock briefly, so writers may interleave between steps.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            array: self,
            next: 0,
            end: self.len(),
        }
    }

    fn read_at(&self, position: usize) -> Result<T> {
        // `position` is non-negative and below the snapshot bound; recheck against the live length
        // in case the array was cleared in between.
        let state = self.read_state()?;
        let position = normalize_index(position as isize, state.len)?;
        Ok(T::decode(state.elements(position, 1)?))
    }
}

/// Iterator returned by [`ArrayFile::iter`]. Stops after the first error.
pub struct Iter<'a, T: Element> {
    array: &'a ArrayFile<T>,
    next: usize,
    end: usize,
}

impl<T: Element> Iterator for Iter<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let item = self.array.read_at(self.next);
        self.next = if item.is_ok() { self.next + 1 } else { self.end };
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (0, Some(remaining))
    }
}

impl<T: Element> FusedIterator for Iter<'_, T> {}

impl<'a, T: Element> IntoIterator for &'a ArrayFile<T> {
    type Item = Result<T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArrayFileError;

    #[test]
    fn get_reads_back_appended_values() {
        let array = ArrayFile::<i32>::temporary().expect("temp");
        array.extend([10, 20, 30]).expect("extend");
        assert_eq!(array.get(0).unwrap(), 10);
        assert_eq!(array.get(2).unwrap(), 30);
        assert_eq!(array.get(-1).unwrap(), 30);
        assert_eq!(array.get(-3).unwrap(), 10);
        assert!(matches!(
            array.get(3),
            Err(ArrayFileError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            array.get(-4),
            Err(ArrayFileError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn empty_array_reads_fail_with_range_error() {
        let array = ArrayFile::<f64>::temporary().expect("temp");
        assert!(matches!(
            array.get(0),
            Err(ArrayFileError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            array.get(-1),
            Err(ArrayFileError::IndexOutOfRange { .. })
        ));
        assert!(!array.contains(&0.0).unwrap());
        assert_eq!(array.iter().count(), 0);
    }

    #[test]
    fn contains_scans_stored_values_only() {
        let array = ArrayFile::<u32>::temporary().expect("temp");
        array.extend([1, 2, 3]).expect("extend");
        assert!(array.contains(&2).unwrap());
        assert!(!array.contains(&4).unwrap());
        // zeroed capacity past `len` must not match
        assert!(!array.contains(&0).unwrap());
    }

    #[test]
    fn iteration_is_restartable_and_bounded_at_start() {
        let array = ArrayFile::<i16>::temporary().expect("temp");
        array.extend([1, 2, 3]).expect("extend");

        let mut iter = array.iter();
        assert_eq!(iter.next().unwrap().unwrap(), 1);
        array.append(4).expect("append during iteration");
        let rest: Vec<i16> = iter.map(|item| item.unwrap()).collect();
        assert_eq!(rest, vec![2, 3]);

        let all: Vec<i16> = (&array).into_iter().collect::<Result<_>>().unwrap();
        assert_eq!(all, vec![1, 2, 3, 4]);
    }

    #[test]
    fn iteration_stops_after_concurrent_clear() {
        let array = ArrayFile::<u8>::temporary().expect("temp");
        array.extend([1, 2, 3]).expect("extend");
        let mut iter = array.iter();
        assert_eq!(iter.next().unwrap().unwrap(), 1);
        array.clear().expect("clear");
        assert!(matches!(
            iter.next(),
            Some(Err(ArrayFileError::IndexOutOfRange { .. }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn reads_after_close_report_not_mapped() {
        let array = ArrayFile::<i32>::temporary().expect("temp");
        array.extend([1, 2]).expect("extend");
        array.close().expect("close");
        assert_eq!(array.len(), 2);
        assert!(matches!(array.get(0), Err(ArrayFileError::NotMapped)));
        assert!(matches!(array.contains(&1), Err(ArrayFileError::NotMapped)));
    }
}
