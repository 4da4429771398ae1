//! Growable arrays that keep removed slots for reuse.

use std::slice;

use crate::error::GenericError;

/// Array whose backing storage outlives its logical length.
///
/// `reset` drops the logical length to zero but keeps the element slots,
/// so a reader can pull an old element back out with [`Array::peek_mut`]
/// and fill it in place. `clear` releases everything, `prune` releases only
/// the slots past the logical length.
#[derive(Debug, Clone)]
pub struct Array<T> {
    elements: Vec<T>,
    size: usize,
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            size: 0,
        }
    }
}

impl<T> Array<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
            size: 0,
        }
    }

    /// Logical length.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T, GenericError> {
        let len = self.size;
        let slot = self
            .get_mut(index)
            .ok_or(GenericError::IndexOutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Append, overwriting a retained slot if there is one.
    pub fn push(&mut self, value: T) {
        if self.size < self.elements.len() {
            self.elements[self.size] = value;
        } else {
            self.grow_if_full();
            self.elements.push(value);
        }
        self.size += 1;
    }

    /// Insert at `index`, shifting later elements right.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), GenericError> {
        if index > self.size {
            return Err(GenericError::IndexOutOfBounds { index, len: self.size });
        }
        self.grow_if_full();
        self.elements.insert(index, value);
        self.size += 1;
        Ok(())
    }

    /// Remove and return the element at `index`.
    pub fn remove(&mut self, index: usize) -> Result<T, GenericError> {
        if index >= self.size {
            return Err(GenericError::IndexOutOfBounds { index, len: self.size });
        }
        self.size -= 1;
        Ok(self.elements.remove(index))
    }

    /// Drop every element and slot.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.size = 0;
    }

    /// Set the logical length to zero, keeping slots for reuse.
    pub fn reset(&mut self) {
        self.size = 0;
    }

    /// Drop slots past the logical length.
    pub fn prune(&mut self) {
        self.elements.truncate(self.size);
    }

    /// Shorten the logical length to `len`, keeping the dropped slots.
    pub fn truncate(&mut self, len: usize) {
        self.size = self.size.min(len);
    }

    pub fn reserve(&mut self, additional: usize) {
        self.elements.reserve(additional);
    }

    /// The retained slot just past the logical end, if any.
    pub fn peek(&self) -> Option<&T> {
        self.elements.get(self.size)
    }

    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.elements.get_mut(self.size)
    }

    /// Reverse the logical elements in place.
    pub fn reverse(&mut self) {
        self.as_mut_slice().reverse();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements[..self.size]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.elements[..self.size]
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    pub fn into_vec(mut self) -> Vec<T> {
        self.prune();
        self.elements
    }

    // Grow by half plus one so repeated pushes amortize.
    fn grow_if_full(&mut self) {
        let len = self.elements.len();
        if len == self.elements.capacity() {
            let target = len * 3 / 2 + 1;
            self.elements.reserve_exact(target - len);
        }
    }
}

impl<T: PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T> From<Vec<T>> for Array<T> {
    fn from(elements: Vec<T>) -> Self {
        let size = elements.len();
        Self { elements, size }
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T> Extend<T> for Array<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> IntoIterator for Array<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
