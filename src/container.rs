//! Growable list backing the per-step argument, input and dependency lists.

use std::ops::Index;

/// Capacity allocated by the first push.
pub const INITIAL_CAPACITY: usize = 32;

/** Append-only ordered sequence with doubling growth
 *
 * # Growth
 * - Nothing is allocated until the first `push`
 * - First allocation reserves `INITIAL_CAPACITY` slots
 * - A full list doubles its capacity before appending
 *
 * # Notes
 * - There is no removal or shrinking; lists only grow while a graph is built
 * - Storage is released when the list is dropped
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepList<T> {
    items: Vec<T>,
}

impl<T> Default for StepList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> StepList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one element, growing by doubling when full.
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.items.capacity() {
            let target = if self.items.capacity() == 0 {
                INITIAL_CAPACITY
            } else {
                self.items.capacity() * 2
            };
            self.items.reserve_exact(target - self.items.len());
        }
        self.items.push(item);
    }

    /// Element at `index`. Panics when `index >= len()`.
    pub fn get(&self, index: usize) -> &T {
        &self.items[index]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Index<usize> for StepList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index)
    }
}

impl<'a, T> IntoIterator for &'a StepList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for StepList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.push(item);
        }
        list
    }
}
