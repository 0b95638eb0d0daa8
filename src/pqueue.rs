//! Priority queue over a 4-ary min-heap in one flat buffer.
//!
//! Items are `(priority, value)` pairs; ordering looks only at the priority
//! key, which stays detached from the carried value. The quaternary shape
//! halves tree height versus a binary heap and keeps the four children of a
//! node on adjacent cache lines.
//!
//! # Invariants
//! - Heap order: `items[(i - 1) / 4].priority <= items[i].priority` for all
//!   `i in 1..count`.
//! - Capacity follows the prime schedule: growth reallocates to the next
//!   prime at or above double the current capacity.
//!
//! Ties are broken arbitrarily; equal priorities carry no insertion-order
//! guarantee.
//!
//! # Threading
//! Not synchronized; assumes a single writer.

use core::fmt;

use crate::primes::next_prime;
use crate::raw_buf::RawBuf;

#[derive(Clone, Copy)]
struct Item<P, V> {
    priority: P,
    value: V,
}

/// Min-heap priority queue: `dequeue` yields values in non-decreasing
/// priority order.
///
/// Underflow is an expected condition here, not a programming error:
/// `dequeue`/`peek` return `None` on an empty queue instead of panicking.
pub struct RawPriorityQueue<P: Copy + Ord, V: Copy> {
    items: RawBuf<Item<P, V>>,
    count: usize,
}

impl<P: Copy + Ord, V: Copy> RawPriorityQueue<P, V> {
    const ARITY: usize = 4;

    /// Creates a queue at the smallest prime capacity.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a queue holding at least `capacity` items before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = next_prime(capacity.min(u32::MAX as usize) as u32) as usize;
        Self {
            items: RawBuf::allocate(capacity),
            count: 0,
        }
    }

    /// Number of queued items.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` when nothing is queued.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Item capacity at the current prime.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Queues `value` with `priority`, sifting it up to its heap position.
    pub fn enqueue(&mut self, value: V, priority: P) {
        if self.count == self.items.capacity() {
            let doubled = (self.items.capacity() * 2).min(u32::MAX as usize) as u32;
            self.grow(next_prime(doubled) as usize);
        }
        // SAFETY: count < capacity after grow.
        unsafe { self.items.write(self.count, Item { priority, value }) };
        self.count += 1;
        self.sift_up(self.count - 1);
    }

    /// Removes the minimum-priority value, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<V> {
        self.dequeue_entry().map(|(_, value)| value)
    }

    /// Removes the minimum-priority `(priority, value)` pair, or `None`.
    pub fn dequeue_entry(&mut self) -> Option<(P, V)> {
        if self.count == 0 {
            return None;
        }
        // SAFETY: count > 0 means the root is live.
        let root = unsafe { self.items.read(0) };
        self.count -= 1;
        if self.count > 0 {
            // SAFETY: the old last item is live; it moves to the root.
            let last = unsafe { self.items.read(self.count) };
            unsafe { self.items.write(0, last) };
            self.sift_down(0);
        }
        Some((root.priority, root.value))
    }

    /// The minimum-priority value without removing it, or `None`.
    #[inline]
    pub fn peek(&self) -> Option<&V> {
        if self.count == 0 {
            None
        } else {
            // SAFETY: the root is live.
            Some(unsafe { &self.items.get_unchecked(0).value })
        }
    }

    /// The minimum-priority `(priority, value)` pair, or `None`.
    #[inline]
    pub fn peek_entry(&self) -> Option<(&P, &V)> {
        if self.count == 0 {
            None
        } else {
            // SAFETY: the root is live.
            let item = unsafe { self.items.get_unchecked(0) };
            Some((&item.priority, &item.value))
        }
    }

    /// Drops every item. Capacity is retained.
    #[inline]
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Grows so at least `capacity` items fit.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.items.capacity() {
            let target = next_prime(capacity.min(u32::MAX as usize) as u32) as usize;
            self.grow(target);
        }
    }

    /// Shrinks to the smallest prime holding the queued items.
    pub fn trim_excess(&mut self) {
        let target = next_prime(self.count.min(u32::MAX as usize) as u32) as usize;
        if target < self.items.capacity() {
            self.items.realloc(target, self.count);
        }
    }

    /// Iterator over `(priority, value)` pairs in storage order — heap
    /// layout, *not* priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&P, &V)> {
        // SAFETY: slots 0..count are live.
        let items = unsafe { self.items.as_slice(self.count) };
        items.iter().map(|item| (&item.priority, &item.value))
    }

    /// Explicitly releases the backing allocation by consuming the queue.
    #[inline]
    pub fn dispose(self) {}

    fn grow(&mut self, new_capacity: usize) {
        self.items.realloc(new_capacity, self.count);
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / Self::ARITY;
            // SAFETY: index and parent are both < count.
            let (child_p, parent_p) = unsafe {
                (
                    self.items.get_unchecked(index).priority,
                    self.items.get_unchecked(parent).priority,
                )
            };
            if child_p >= parent_p {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let first_child = index * Self::ARITY + 1;
            if first_child >= self.count {
                break;
            }
            let last_child = (first_child + Self::ARITY).min(self.count);
            let mut min_child = first_child;
            for child in first_child + 1..last_child {
                // SAFETY: child < count.
                let (a, b) = unsafe {
                    (
                        self.items.get_unchecked(child).priority,
                        self.items.get_unchecked(min_child).priority,
                    )
                };
                if a < b {
                    min_child = child;
                }
            }
            // SAFETY: min_child and index are both < count.
            let (child_p, node_p) = unsafe {
                (
                    self.items.get_unchecked(min_child).priority,
                    self.items.get_unchecked(index).priority,
                )
            };
            if child_p >= node_p {
                break;
            }
            self.swap(index, min_child);
            index = min_child;
        }
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        debug_assert!(a < self.count && b < self.count);
        // SAFETY: both indices are live; plain bitwise exchange.
        unsafe {
            let tmp = self.items.read(a);
            let other = self.items.read(b);
            self.items.write(a, other);
            self.items.write(b, tmp);
        }
    }
}

impl<P: Copy + Ord, V: Copy> Default for RawPriorityQueue<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, V> fmt::Debug for RawPriorityQueue<P, V>
where
    P: Copy + Ord + fmt::Debug,
    V: Copy + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PROPTEST_CASES: u32 = 16;

    #[test]
    fn dequeues_in_priority_order() {
        let mut q = RawPriorityQueue::new();
        for p in [5, 3, 8, 1, 9, 2] {
            q.enqueue(p * 10, p);
        }
        let drained: Vec<i32> = std::iter::from_fn(|| q.dequeue()).collect();
        assert_eq!(drained, vec![10, 20, 30, 50, 80, 90]);
    }

    #[test]
    fn underflow_returns_none() {
        let mut q: RawPriorityQueue<i32, i32> = RawPriorityQueue::new();
        assert_eq!(q.dequeue(), None);
        assert_eq!(q.peek(), None);
        assert_eq!(q.dequeue_entry(), None);
    }

    #[test]
    fn peek_matches_next_dequeue() {
        let mut q = RawPriorityQueue::new();
        q.enqueue("b", 2);
        q.enqueue("a", 1);
        assert_eq!(q.peek(), Some(&"a"));
        assert_eq!(q.peek_entry(), Some((&1, &"a")));
        assert_eq!(q.dequeue(), Some("a"));
        assert_eq!(q.peek(), Some(&"b"));
    }

    #[test]
    fn value_rides_with_priority() {
        let mut q = RawPriorityQueue::new();
        q.enqueue(100u64, 3u8);
        q.enqueue(200, 1);
        q.enqueue(300, 2);
        assert_eq!(q.dequeue_entry(), Some((1, 200)));
        assert_eq!(q.dequeue_entry(), Some((2, 300)));
        assert_eq!(q.dequeue_entry(), Some((3, 100)));
    }

    #[test]
    fn growth_follows_prime_schedule() {
        let mut q = RawPriorityQueue::new();
        assert_eq!(q.capacity(), 3);
        for i in 0..4 {
            q.enqueue(i, i);
        }
        assert_eq!(q.capacity(), 7);
        for i in 4..8 {
            q.enqueue(i, i);
        }
        assert_eq!(q.capacity(), 17);
    }

    #[test]
    fn trim_excess_shrinks_to_prime() {
        let mut q = RawPriorityQueue::new();
        for i in 0..100 {
            q.enqueue(i, i);
        }
        let grown = q.capacity();
        for _ in 0..95 {
            q.dequeue();
        }
        q.trim_excess();
        assert!(q.capacity() < grown);
        // Remaining items unharmed and still ordered.
        let rest: Vec<i32> = std::iter::from_fn(|| q.dequeue()).collect();
        assert_eq!(rest, vec![95, 96, 97, 98, 99]);
    }

    #[test]
    fn duplicate_priorities_all_surface() {
        let mut q = RawPriorityQueue::new();
        for v in 0..10u32 {
            q.enqueue(v, 1u8);
        }
        let mut drained: Vec<u32> = std::iter::from_fn(|| q.dequeue()).collect();
        drained.sort_unstable();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(
            crate::test_utils::proptest_cases(PROPTEST_CASES)
        ))]

        /// Drain order is non-decreasing and a permutation of the input,
        /// regardless of enqueue order (checked against a sorted copy).
        #[test]
        fn heap_order(priorities in prop::collection::vec(any::<i32>(), 0..500)) {
            let mut q = RawPriorityQueue::new();
            for (i, &p) in priorities.iter().enumerate() {
                q.enqueue(i as u32, p);
            }
            let mut drained = Vec::new();
            while let Some((p, _)) = q.dequeue_entry() {
                drained.push(p);
            }
            prop_assert!(drained.windows(2).all(|w| w[0] <= w[1]));
            let mut expected = priorities.clone();
            expected.sort_unstable();
            prop_assert_eq!(drained, expected);
        }

        /// Interleaved enqueue/dequeue tracks std BinaryHeap (as min-heap).
        #[test]
        fn model(ops in prop::collection::vec(prop::option::of(any::<i16>()), 0..300)) {
            use std::cmp::Reverse;
            use std::collections::BinaryHeap;

            let mut q: RawPriorityQueue<i16, i16> = RawPriorityQueue::new();
            let mut shadow: BinaryHeap<Reverse<i16>> = BinaryHeap::new();

            for op in ops {
                match op {
                    Some(p) => {
                        q.enqueue(p, p);
                        shadow.push(Reverse(p));
                    }
                    None => {
                        let got = q.dequeue_entry().map(|(p, _)| p);
                        let expected = shadow.pop().map(|Reverse(p)| p);
                        prop_assert_eq!(got, expected);
                    }
                }
                prop_assert_eq!(q.len(), shadow.len());
            }
        }
    }
}
