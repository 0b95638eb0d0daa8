//! Boolean array with bulk set/flip/count and element-wise algebra.
//!
//! Storage is one `bool` byte per element, not packed machine words. That
//! trades an 8x memory density loss for branch-free single-element access
//! (no shift/mask on the hot path) and byte-granular bulk writes via
//! `memset`. Callers wanting packed density should reach for a word-packed
//! bitset instead; this type deliberately keeps the unpacked representation.
//!
//! `length` and `capacity` are tracked separately so the array can be grown
//! with [`ensure_capacity`](BitArray::ensure_capacity) without respecifying
//! elements, and shrunk with [`trim_excess`](BitArray::trim_excess).
//!
//! # Threading
//! Not synchronized; assumes a single writer.

use core::fmt;
use core::ops::Index;

use crate::error::RegionError;
use crate::raw_buf::RawBuf;
use crate::vec::region_extent;

/// Growable array of individually addressable booleans.
pub struct BitArray {
    bits: RawBuf<bool>,
    length: usize,
}

impl BitArray {
    /// Creates `length` flags, all `false`.
    ///
    /// # Panics
    /// Panics if `length == 0`.
    pub fn new(length: usize) -> Self {
        Self::filled(length, false)
    }

    /// Creates `length` flags, all set to `value`.
    ///
    /// # Panics
    /// Panics if `length == 0`.
    pub fn filled(length: usize, value: bool) -> Self {
        assert!(length > 0, "bit array length must be positive");
        let mut bits = RawBuf::allocate(length);
        // SAFETY: filling every slot with a valid bool byte initializes the
        // whole buffer.
        unsafe {
            core::ptr::write_bytes(bits.as_mut_ptr(), value as u8, length);
        }
        Self { bits, length }
    }

    /// Creates an array holding a copy of `values`.
    ///
    /// # Panics
    /// Panics if `values` is empty.
    pub fn from_slice(values: &[bool]) -> Self {
        assert!(!values.is_empty(), "bit array length must be positive");
        let mut bits = RawBuf::allocate(values.len());
        // SAFETY: fresh buffer with values.len() slots; ranges disjoint.
        unsafe {
            core::ptr::copy_nonoverlapping(values.as_ptr(), bits.as_mut_ptr(), values.len());
        }
        Self {
            bits,
            length: values.len(),
        }
    }

    /// Builds an array over the aligned remainder of a caller byte region,
    /// reading each byte's low bit as the flag value and copying into fresh
    /// owned storage. Returns the skipped alignment offset.
    pub fn from_bytes(region: &[u8]) -> Result<(usize, Self), RegionError> {
        let (offset, count) = region_extent::<u8>(region)?;
        let mut bits = RawBuf::allocate(count);
        for (i, &byte) in region[offset..offset + count].iter().enumerate() {
            // SAFETY: i < count == capacity; writing normalizes arbitrary
            // bytes into valid bool values.
            unsafe { bits.write(i, byte & 1 != 0) };
        }
        Ok((
            offset,
            Self {
                bits,
                length: count,
            },
        ))
    }

    /// Number of addressable flags.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Always `false`: construction rejects zero lengths.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Flags the current allocation can hold.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.bits.capacity()
    }

    /// The flag at `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.as_slice()[index]
    }

    /// Sets the flag at `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        self.as_mut_slice()[index] = value;
    }

    /// Inverts the flag at `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline]
    pub fn flip(&mut self, index: usize) {
        let slot = &mut self.as_mut_slice()[index];
        *slot = !*slot;
    }

    /// Sets `count` flags starting at `index`.
    ///
    /// # Panics
    /// Panics if the range exceeds `len()`.
    pub fn set_range(&mut self, index: usize, count: usize, value: bool) {
        assert!(
            index.checked_add(count).is_some_and(|end| end <= self.length),
            "range {index}..{index}+{count} out of range for length {}",
            self.length
        );
        // SAFETY: range checked against length; a bool byte write is valid.
        unsafe {
            core::ptr::write_bytes(self.bits.as_mut_ptr().add(index), value as u8, count);
        }
    }

    /// Sets every flag to `value`.
    pub fn set_all(&mut self, value: bool) {
        self.set_range(0, self.length, value);
    }

    /// Inverts every flag.
    pub fn flip_all(&mut self) {
        for flag in self.as_mut_slice() {
            *flag = !*flag;
        }
    }

    /// Number of `true` flags.
    pub fn count_true(&self) -> usize {
        self.as_slice().iter().filter(|&&b| b).count()
    }

    /// Number of `false` flags.
    #[inline]
    pub fn count_false(&self) -> usize {
        self.length - self.count_true()
    }

    /// Returns `true` if at least one flag is set.
    pub fn any(&self) -> bool {
        self.as_slice().iter().any(|&b| b)
    }

    /// Returns `true` if every flag is set.
    pub fn all(&self) -> bool {
        self.as_slice().iter().all(|&b| b)
    }

    /// Returns `true` if no flag is set.
    #[inline]
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// In-place element-wise AND with an equal-length array.
    ///
    /// # Panics
    /// Panics if the lengths differ.
    pub fn and(&mut self, other: &BitArray) {
        self.check_same_length(other);
        for (a, &b) in self.as_mut_slice().iter_mut().zip(other.as_slice()) {
            *a = *a && b;
        }
    }

    /// In-place element-wise OR with an equal-length array.
    ///
    /// # Panics
    /// Panics if the lengths differ.
    pub fn or(&mut self, other: &BitArray) {
        self.check_same_length(other);
        for (a, &b) in self.as_mut_slice().iter_mut().zip(other.as_slice()) {
            *a = *a || b;
        }
    }

    /// In-place element-wise XOR with an equal-length array.
    ///
    /// # Panics
    /// Panics if the lengths differ.
    pub fn xor(&mut self, other: &BitArray) {
        self.check_same_length(other);
        for (a, &b) in self.as_mut_slice().iter_mut().zip(other.as_slice()) {
            *a = *a != b;
        }
    }

    /// In-place element-wise NOT (alias for [`flip_all`](Self::flip_all)).
    #[inline]
    pub fn not(&mut self) {
        self.flip_all();
    }

    /// Copies all flags into the front of `dest`.
    ///
    /// # Panics
    /// Panics if `dest` is shorter than `len()`.
    pub fn copy_to(&self, dest: &mut [bool]) {
        assert!(dest.len() >= self.length, "destination shorter than array length");
        dest[..self.length].copy_from_slice(self.as_slice());
    }

    /// The flags as a `Vec<bool>`.
    pub fn to_vec(&self) -> Vec<bool> {
        self.as_slice().to_vec()
    }

    /// Copies the range `[start, start + count)` into a new array.
    ///
    /// # Panics
    /// Panics if the range exceeds `len()` or is empty.
    pub fn slice(&self, start: usize, count: usize) -> Self {
        assert!(
            start.checked_add(count).is_some_and(|end| end <= self.length),
            "slice {start}..{start}+{count} out of range for length {}",
            self.length
        );
        Self::from_slice(&self.as_slice()[start..start + count])
    }

    /// Grows the allocation so at least `capacity` flags fit. New capacity
    /// beyond `len()` is usable after a later length-extending operation;
    /// existing flags are untouched.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.bits.capacity() {
            self.bits.realloc(capacity, self.length);
        }
    }

    /// Appends `count` flags set to `value`, growing as needed.
    pub fn extend(&mut self, count: usize, value: bool) {
        let required = self.length + count;
        if required > self.bits.capacity() {
            let doubled = self.bits.capacity() * 2;
            self.bits.realloc(required.max(doubled), self.length);
        }
        // SAFETY: capacity now covers the appended range.
        unsafe {
            core::ptr::write_bytes(self.bits.as_mut_ptr().add(self.length), value as u8, count);
        }
        self.length = required;
    }

    /// Shrinks the allocation to `len()`.
    pub fn trim_excess(&mut self) {
        if self.length < self.bits.capacity() {
            self.bits.realloc(self.length, self.length);
        }
    }

    /// The flags as a shared slice.
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        // SAFETY: 0..length is initialized at construction and kept so.
        unsafe { self.bits.as_slice(self.length) }
    }

    /// The flags as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [bool] {
        let length = self.length;
        // SAFETY: 0..length is initialized at construction and kept so.
        unsafe { self.bits.as_mut_slice(length) }
    }

    /// Iterator over the flags.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, bool> {
        self.as_slice().iter()
    }

    /// Explicitly releases the backing allocation by consuming the array.
    #[inline]
    pub fn dispose(self) {}

    #[inline]
    fn check_same_length(&self, other: &BitArray) {
        assert!(
            self.length == other.length,
            "length mismatch: {} vs {}",
            self.length,
            other.length
        );
    }
}

impl Index<usize> for BitArray {
    type Output = bool;

    #[inline]
    fn index(&self, index: usize) -> &bool {
        &self.as_slice()[index]
    }
}

impl Clone for BitArray {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }
}

impl PartialEq for BitArray {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for BitArray {}

impl fmt::Debug for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in self.as_slice() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "bits_tests.rs"]
mod bits_tests;
