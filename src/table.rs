//! Chained-bucket hash engine shared by [`crate::map::RawMap`] and
//! [`crate::set::RawSet`].
//!
//! One algorithm, parameterized on whether entries carry a payload (the set
//! instantiates `V = ()`), exposed through thin facades instead of being
//! duplicated.
//!
//! # Layout
//! - `buckets`: `capacity` slot indices, `0` = empty, `i + 1` = entry `i`
//!   (1-based so the zeroed state means "empty", and index 0 stays usable).
//! - `entries`: flat array of `{ hash, next, key, value }`; `next` chains
//!   entries that share a bucket, `-1` terminates.
//! - Vacated slots keep their position: removal tombstones the entry
//!   (`hash = 0`) and threads its index onto a free list through `next`, so
//!   the next insertion reuses the slot before the high-water mark grows.
//!
//! # Invariants
//! - `capacity` is always a prime from the curated table, and
//!   `multiplier == fast_mod_multiplier(capacity)`.
//! - Slots `0..count` have been fully written at least once; slots at or
//!   above `count` are uninitialized storage.
//! - Live entries have `hash != 0`; key hashes are remapped so a computed 0
//!   becomes 1, which keeps a real key hashing to 0 valid while letting the
//!   zero sentinel alone distinguish entries from tombstones.
//! - `len() == count - free_count` equals the number of chain-reachable,
//!   non-tombstoned entries.
//!
//! # Concurrency guard
//! Chain walks count their steps; more steps than `capacity` means the
//! chain was corrupted (typically by unsynchronized cross-thread mutation)
//! and the walk panics rather than spin on a cycle. This is a heuristic,
//! not a thread-safety mechanism.

use core::hash::{BuildHasher, Hash};

use crate::primes::{expand_prime, fast_mod, fast_mod_multiplier, next_prime};
use crate::raw_buf::RawBuf;

/// A single engine slot. `value` is `()` for set use.
#[derive(Clone, Copy)]
pub(crate) struct Entry<K, V> {
    pub hash: u32,
    pub next: i32,
    pub key: K,
    pub value: V,
}

/// Outcome of [`RawTable::insert`].
pub(crate) enum InsertState {
    /// The key was absent; a new entry now lives at this index.
    Added(u32),
    /// The key already existed at this index; nothing was written unless
    /// overwrite was requested.
    Exists(u32),
}

pub(crate) struct RawTable<K, V, S> {
    buckets: RawBuf<u32>,
    entries: RawBuf<Entry<K, V>>,
    capacity: u32,
    /// High-water mark of entry slots ever used.
    count: u32,
    /// Head of the vacated-slot list, `-1` when empty.
    free_list: i32,
    free_count: u32,
    multiplier: u64,
    version: u32,
    hasher: S,
}

impl<K, V, S> RawTable<K, V, S>
where
    K: Copy + Eq + Hash,
    V: Copy,
    S: BuildHasher,
{
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let capacity = next_prime(capacity.min(u32::MAX as usize) as u32);
        Self {
            buckets: RawBuf::allocate_zeroed(capacity as usize),
            entries: RawBuf::allocate(capacity as usize),
            capacity,
            count: 0,
            free_list: -1,
            free_count: 0,
            multiplier: fast_mod_multiplier(capacity),
            version: 0,
            hasher,
        }
    }

    /// Live entry count.
    #[inline(always)]
    pub fn len(&self) -> usize {
        (self.count - self.free_count) as usize
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    /// Mutation stamp; increments on every structural change.
    #[inline(always)]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Key hash with the tombstone sentinel excluded: a computed 0 is
    /// remapped to 1 so live entries always satisfy `hash != 0`.
    #[inline]
    fn hash_of(&self, key: &K) -> u32 {
        let h = self.hasher.hash_one(key) as u32;
        if h == 0 {
            1
        } else {
            h
        }
    }

    #[inline]
    fn bucket_of(&self, hash: u32) -> usize {
        fast_mod(hash, self.capacity, self.multiplier) as usize
    }

    /// Index of the entry holding `key`, if present.
    pub fn find(&self, key: &K) -> Option<u32> {
        let hash = self.hash_of(key);
        self.find_hashed(hash, key)
    }

    fn find_hashed(&self, hash: u32, key: &K) -> Option<u32> {
        let bucket = self.bucket_of(hash);
        // SAFETY: bucket < capacity; buckets are always initialized.
        let mut i = unsafe { *self.buckets.get_unchecked(bucket) } as i64 - 1;
        let mut collisions = 0u32;
        while i >= 0 {
            // SAFETY: chain indices always reference written slots < count.
            let entry = unsafe { self.entries.get_unchecked(i as usize) };
            if entry.hash == hash && entry.key == *key {
                return Some(i as u32);
            }
            i = entry.next as i64;
            collisions += 1;
            if collisions > self.capacity {
                panic!("concurrent operations not supported");
            }
        }
        None
    }

    /// Inserts `key`, taking a vacated slot when one exists, growing first
    /// when the entry array is full. With `overwrite`, an existing entry's
    /// value is replaced; otherwise it is left untouched.
    pub fn insert(&mut self, key: K, value: V, overwrite: bool) -> InsertState {
        let hash = self.hash_of(&key);
        if let Some(index) = self.find_hashed(hash, &key) {
            if overwrite {
                // SAFETY: index references a written slot.
                unsafe { self.entries.get_unchecked_mut(index as usize) }.value = value;
                self.version = self.version.wrapping_add(1);
            }
            return InsertState::Exists(index);
        }
        InsertState::Added(self.push_entry(hash, key, value))
    }

    /// Links a new entry for a key known to be absent.
    fn push_entry(&mut self, hash: u32, key: K, value: V) -> u32 {
        let index = if self.free_count > 0 {
            let index = self.free_list as u32;
            // SAFETY: the free list only holds vacated slots < count.
            self.free_list = unsafe { self.entries.get_unchecked(index as usize) }.next;
            self.free_count -= 1;
            index
        } else {
            if self.count == self.capacity {
                self.resize(expand_prime(self.count) as usize);
            }
            let index = self.count;
            self.count += 1;
            index
        };

        let bucket = self.bucket_of(hash);
        // SAFETY: bucket < capacity.
        let chain_head = unsafe { *self.buckets.get_unchecked(bucket) } as i32 - 1;
        // SAFETY: index < capacity; writing the full entry initializes the
        // slot before it becomes chain-reachable.
        unsafe {
            self.entries.write(
                index as usize,
                Entry {
                    hash,
                    next: chain_head,
                    key,
                    value,
                },
            );
            *self.buckets.get_unchecked_mut(bucket) = index + 1;
        }
        self.version = self.version.wrapping_add(1);
        index
    }

    /// Unlinks `key`'s entry, tombstones it, and pushes the slot onto the
    /// free list. Returns the removed value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.hash_of(key);
        let bucket = self.bucket_of(hash);
        // SAFETY: bucket < capacity.
        let mut i = unsafe { *self.buckets.get_unchecked(bucket) } as i64 - 1;
        let mut prev: i64 = -1;
        let mut collisions = 0u32;
        while i >= 0 {
            // SAFETY: chain indices reference written slots.
            let entry = *unsafe { self.entries.get_unchecked(i as usize) };
            if entry.hash == hash && entry.key == *key {
                if prev < 0 {
                    // SAFETY: bucket < capacity.
                    unsafe { *self.buckets.get_unchecked_mut(bucket) = (entry.next + 1) as u32 };
                } else {
                    // SAFETY: prev references a written slot.
                    unsafe { self.entries.get_unchecked_mut(prev as usize) }.next = entry.next;
                }
                {
                    // SAFETY: i references a written slot.
                    let slot = unsafe { self.entries.get_unchecked_mut(i as usize) };
                    slot.hash = 0;
                    slot.next = self.free_list;
                }
                self.free_list = i as i32;
                self.free_count += 1;
                self.version = self.version.wrapping_add(1);
                return Some(entry.value);
            }
            prev = i;
            i = entry.next as i64;
            collisions += 1;
            if collisions > self.capacity {
                panic!("concurrent operations not supported");
            }
        }
        None
    }

    /// Shared reference to the entry at a [`find`](Self::find) result.
    #[inline]
    pub fn entry(&self, index: u32) -> &Entry<K, V> {
        debug_assert!(index < self.count);
        // SAFETY: indices handed out by find/insert reference written slots.
        unsafe { self.entries.get_unchecked(index as usize) }
    }

    /// Mutable reference to the entry at a [`find`](Self::find) result.
    #[inline]
    pub fn entry_mut(&mut self, index: u32) -> &mut Entry<K, V> {
        debug_assert!(index < self.count);
        // SAFETY: indices handed out by find/insert reference written slots.
        unsafe { self.entries.get_unchecked_mut(index as usize) }
    }

    /// Drops every entry. Capacity is retained.
    pub fn clear(&mut self) {
        if self.len() == 0 && self.count == 0 {
            return;
        }
        // SAFETY: zeroing the bucket array resets every chain head to the
        // "empty" sentinel; u32 zero is a valid value.
        unsafe {
            core::ptr::write_bytes(self.buckets.as_mut_ptr(), 0, self.capacity as usize);
        }
        self.count = 0;
        self.free_list = -1;
        self.free_count = 0;
        self.version = self.version.wrapping_add(1);
    }

    /// Grows so at least `capacity` entries fit without rehashing again.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.capacity as usize {
            self.resize(capacity);
        }
    }

    /// Shrinks to the smallest prime holding the live entries, compacting
    /// vacated slots away.
    pub fn trim_excess(&mut self) {
        let target = next_prime(self.len().min(u32::MAX as usize) as u32);
        if target < self.capacity {
            self.resize(target as usize);
        }
    }

    /// Rebuilds bucket and entry arrays at the next prime >= `target`,
    /// re-chaining every live entry (order not preserved) and compacting
    /// tombstones. Trailing capacity is reached by appending, so the free
    /// list restarts empty.
    fn resize(&mut self, target: usize) {
        let live = self.len();
        let new_capacity = next_prime(target.max(live).min(u32::MAX as usize) as u32);
        let new_multiplier = fast_mod_multiplier(new_capacity);
        let mut new_buckets: RawBuf<u32> = RawBuf::allocate_zeroed(new_capacity as usize);
        let mut new_entries: RawBuf<Entry<K, V>> = RawBuf::allocate(new_capacity as usize);

        let mut new_count: u32 = 0;
        for i in 0..self.count as usize {
            // SAFETY: i < count, slot written.
            let entry = unsafe { self.entries.get_unchecked(i) };
            if entry.hash == 0 {
                continue;
            }
            let bucket = fast_mod(entry.hash, new_capacity, new_multiplier) as usize;
            // SAFETY: bucket < new_capacity; new_count < new_capacity
            // because new_capacity >= live and only live entries re-insert.
            unsafe {
                let chain_head = *new_buckets.get_unchecked(bucket) as i32 - 1;
                new_entries.write(
                    new_count as usize,
                    Entry {
                        hash: entry.hash,
                        next: chain_head,
                        key: entry.key,
                        value: entry.value,
                    },
                );
                *new_buckets.get_unchecked_mut(bucket) = new_count + 1;
            }
            new_count += 1;
        }
        debug_assert_eq!(new_count as usize, live);

        self.buckets = new_buckets;
        self.entries = new_entries;
        self.capacity = new_capacity;
        self.count = new_count;
        self.free_list = -1;
        self.free_count = 0;
        self.multiplier = new_multiplier;
        self.version = self.version.wrapping_add(1);
    }

    /// All written slots, live and tombstoned alike; iteration filters on
    /// `hash != 0`.
    #[inline]
    pub fn raw_entries(&self) -> &[Entry<K, V>] {
        // SAFETY: slots 0..count have all been fully written.
        unsafe { self.entries.as_slice(self.count as usize) }
    }

    /// Iterator over live `(key, value)` entries, storage order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            entries: self.raw_entries(),
            pos: 0,
        }
    }

    /// High-water slot index currently in use (test hook for slot-reuse
    /// assertions).
    #[cfg(test)]
    pub fn high_water(&self) -> u32 {
        self.count
    }
}

pub(crate) struct Iter<'a, K, V> {
    entries: &'a [Entry<K, V>],
    pos: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.entries.len() {
            let entry = &self.entries[self.pos];
            self.pos += 1;
            if entry.hash != 0 {
                return Some((&entry.key, &entry.value));
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod table_tests;
