//! Frame-indexed trigger codes for a single animation

use crate::ValidationError;
use std::collections::{btree_map, BTreeMap};

/// Number of frames a record can hold trigger codes for
pub const FRAME_MAX: usize = 144;

/// Largest valid trigger code. Code 0 means "no trigger" and is never stored.
pub const CODE_MAX: u8 = 3;

/// Sparse mapping from frame index to trigger code.
///
/// Only validated mutation is exposed: frames must lie in `0..144` and codes in
/// `1..=3`. Iteration is always in ascending frame order, so two maps with the
/// same content serialize identically.
///
/// ```
/// use animdata_core::ActionTriggers;
///
/// let mut triggers = ActionTriggers::new();
/// triggers.set(10, 2).unwrap();
/// triggers.set(7, 1).unwrap();
/// assert_eq!(triggers.iter().collect::<Vec<_>>(), vec![(7, 1), (10, 2)]);
///
/// assert!(triggers.set(255, 1).is_err());
/// assert!(triggers.set(3, 4).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ActionTriggers {
    codes: BTreeMap<u8, u8>,
}

impl ActionTriggers {
    /// Creates an empty trigger map
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the trigger code for a frame, replacing any previous code
    pub fn set(&mut self, frame: usize, code: u8) -> Result<(), ValidationError> {
        let frame = check_frame(frame)?;
        check_code(code)?;
        self.codes.insert(frame, code);
        Ok(())
    }

    /// Removes the trigger at `frame`, returning its code if one was set
    pub fn unset(&mut self, frame: usize) -> Option<u8> {
        u8::try_from(frame)
            .ok()
            .and_then(|frame| self.codes.remove(&frame))
    }

    /// Returns the code at `frame`, if any
    pub fn get(&self, frame: usize) -> Option<u8> {
        u8::try_from(frame)
            .ok()
            .and_then(|frame| self.codes.get(&frame).copied())
    }

    /// Iterates `(frame, code)` pairs in ascending frame order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.codes.iter(),
        }
    }

    /// Iterates frames that carry a trigger, in ascending order
    pub fn frames(&self) -> impl Iterator<Item = u8> + '_ {
        self.codes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }

    /// Expands the map into one code per frame, using 0 where no trigger is set
    pub fn to_dense_codes(&self) -> [u8; FRAME_MAX] {
        let mut dense = [0u8; FRAME_MAX];
        for (frame, code) in self.iter() {
            dense[frame as usize] = code;
        }
        dense
    }

    /// Builds a trigger map from exactly [`FRAME_MAX`] codes, skipping zeros
    pub fn from_dense_codes(codes: &[u8]) -> Result<Self, ValidationError> {
        if codes.len() != FRAME_MAX {
            return Err(ValidationError::DenseLength(codes.len()));
        }

        let mut triggers = Self::new();
        for (frame, &code) in codes.iter().enumerate() {
            if code != 0 {
                triggers.set(frame, code)?;
            }
        }
        Ok(triggers)
    }

    /// Builds a trigger map from `(frame, code)` pairs.
    ///
    /// A later pair for the same frame replaces an earlier one.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (usize, u8)>,
    {
        let mut triggers = Self::new();
        for (frame, code) in pairs {
            triggers.set(frame, code)?;
        }
        Ok(triggers)
    }
}

/// Iterator over `(frame, code)` pairs of an [`ActionTriggers`]
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, u8, u8>,
}

impl Iterator for Iter<'_> {
    type Item = (u8, u8);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(&frame, &code)| (frame, code))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a ActionTriggers {
    type Item = (u8, u8);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_frame(frame: usize) -> Result<u8, ValidationError> {
    if frame >= FRAME_MAX {
        return Err(ValidationError::FrameOutOfRange(frame as i128));
    }
    Ok(frame as u8)
}

fn check_code(code: u8) -> Result<(), ValidationError> {
    if !(1..=CODE_MAX).contains(&code) {
        return Err(ValidationError::CodeOutOfRange(code as i128));
    }
    Ok(())
}
