//! Collections with a hard maximum cardinality.
//!
//! The limit is checked on every mutation. A call that would exceed it fails
//! with [`Error::CapacityExceeded`] and leaves the collection untouched; the
//! encoder never truncates.

use std::ops::Deref;

use crate::{Error, Result};

/// A `Vec<T>` holding at most `N` entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundedVec<T, const N: usize> {
    items: Vec<T>,
}

impl<T, const N: usize> Default for BoundedVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> BoundedVec<T, N> {
    /// Maximum number of entries.
    pub const CAPACITY: usize = N;

    /// Creates an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn exceeded(requested: usize) -> Error {
        Error::CapacityExceeded {
            kind: std::any::type_name::<T>(),
            capacity: N,
            requested,
        }
    }

    /// Appends `item`.
    pub fn push(&mut self, item: T) -> Result<()> {
        if self.items.len() >= N {
            return Err(Self::exceeded(self.items.len() + 1));
        }
        self.items.push(item);
        Ok(())
    }

    /// Inserts `item` at `index`, shifting later entries.
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        if self.items.len() >= N {
            return Err(Self::exceeded(self.items.len() + 1));
        }
        if index > self.items.len() {
            return Err(Error::invalid_value(format!(
                "insert index {index} past length {}",
                self.items.len()
            )));
        }
        self.items.insert(index, item);
        Ok(())
    }

    /// Replaces the entry at `index`, returning the old one.
    pub fn set(&mut self, index: usize, item: T) -> Result<T> {
        match self.items.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, item)),
            None => Err(Error::invalid_value(format!(
                "index {index} past length {}",
                self.items.len()
            ))),
        }
    }

    /// Replaces the whole content.
    pub fn replace_all(&mut self, items: Vec<T>) -> Result<()> {
        if items.len() > N {
            return Err(Self::exceeded(items.len()));
        }
        self.items = items;
        Ok(())
    }

    /// Removes and returns the entry at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// True when another `push` would fail.
    pub fn is_full(&self) -> bool {
        self.items.len() >= N
    }

    /// Entries as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consumes the collection.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T, const N: usize> Deref for BoundedVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T, const N: usize> TryFrom<Vec<T>> for BoundedVec<T, N> {
    type Error = Error;

    fn try_from(items: Vec<T>) -> Result<Self> {
        let mut out = Self::new();
        out.replace_all(items)?;
        Ok(out)
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a BoundedVec<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
