//! Key-only facade over the shared hash engine.
//!
//! A `RawSet` is the engine with a unit payload: same bucket chains, same
//! free-list reuse, same prime growth, no value storage. [`get`](RawSet::get)
//! returns the *stored* element for a matching probe, which makes the set
//! usable for interning bitwise-distinct-but-equal keys.

use core::fmt;
use core::hash::{BuildHasher, Hash};

use crate::table::{InsertState, RawTable};

/// Hash set of `Copy` elements with manually managed storage.
pub struct RawSet<T: Copy + Eq + Hash, S: BuildHasher = ahash::RandomState> {
    table: RawTable<T, (), S>,
}

impl<T: Copy + Eq + Hash> RawSet<T, ahash::RandomState> {
    /// Creates a set at the smallest prime capacity.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a set holding at least `capacity` elements before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: RawTable::with_capacity_and_hasher(capacity, ahash::RandomState::new()),
        }
    }
}

impl<T: Copy + Eq + Hash, S: BuildHasher> RawSet<T, S> {
    /// Creates a set with a caller-supplied hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: RawTable::with_capacity_and_hasher(0, hasher),
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` when no elements are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Element capacity at the current prime.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Mutation stamp; increments on every structural change.
    #[inline]
    pub fn version(&self) -> u32 {
        self.table.version()
    }

    /// Inserts `value`. Returns `false` when an equal element is already
    /// present (the stored element is kept).
    pub fn insert(&mut self, value: T) -> bool {
        matches!(self.table.insert(value, (), false), InsertState::Added(_))
    }

    /// Returns `true` if an equal element is present.
    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.table.find(value).is_some()
    }

    /// The stored element equal to `value`, or `None`.
    #[inline]
    pub fn get(&self, value: &T) -> Option<&T> {
        self.table.find(value).map(|i| &self.table.entry(i).key)
    }

    /// Removes the element equal to `value`. Returns `false` when absent.
    pub fn remove(&mut self, value: &T) -> bool {
        self.table.remove(value).is_some()
    }

    /// Removes and returns the stored element equal to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let index = self.table.find(value)?;
        let stored = self.table.entry(index).key;
        self.table.remove(value);
        Some(stored)
    }

    /// Drops every element. Capacity is retained.
    #[inline]
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Grows so at least `capacity` elements fit without rehashing again.
    #[inline]
    pub fn ensure_capacity(&mut self, capacity: usize) {
        self.table.ensure_capacity(capacity);
    }

    /// Shrinks to the smallest prime holding the live elements.
    #[inline]
    pub fn trim_excess(&mut self) {
        self.table.trim_excess();
    }

    /// Iterator over elements in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.table.iter().map(|(k, _)| k)
    }

    /// Bitwise-copies all elements into the front of `dest`.
    ///
    /// # Panics
    /// Panics if `dest` is shorter than `len()`.
    pub fn copy_to(&self, dest: &mut [T]) {
        assert!(dest.len() >= self.len(), "destination shorter than set length");
        for (slot, value) in dest.iter_mut().zip(self.iter()) {
            *slot = *value;
        }
    }

    /// Explicitly releases the backing allocations by consuming the set.
    #[inline]
    pub fn dispose(self) {}
}

impl<T: Copy + Eq + Hash> Default for RawSet<T, ahash::RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> fmt::Debug for RawSet<T, S>
where
    T: Copy + Eq + Hash + fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Copy + Eq + Hash> FromIterator<T> for RawSet<T, ahash::RandomState> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}
