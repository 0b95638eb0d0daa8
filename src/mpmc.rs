//! Lock-free multi-producer/multi-consumer queue over a linked list of
//! fixed-size segments.
//!
//! # Design
//!
//! A Michael–Scott-style list of 32-slot segments. Producers reserve a slot
//! by compare-and-swap on the tail segment's `high` cursor; when the segment
//! is full, the thread that wins the CAS linking a fresh segment swings the
//! shared tail, and losers destroy the segment they speculatively allocated
//! and retry. Consumers reserve by CAS on the head segment's `low` cursor;
//! a consumer that finds the head exhausted (`low >= high`) with a
//! successor swings the shared head past it and retires it.
//!
//! # Ordering rationale
//!
//! ```text
//! Producer: CAS high (AcqRel) -> write slot -> store ready (Release)
//! Consumer: CAS low (AcqRel) -> load ready (Acquire, bounded spin) -> read slot
//! ```
//!
//! Slot publication is explicit: the winning producer writes the value and
//! release-stores the slot's `ready` stamp, and consumers acquire-load the
//! stamp before reading. The reserve-then-publish gap is a handful of
//! instructions, so the consumer-side spin is bounded in practice. Each
//! slot is written once and read once; only the cursors and list pointers
//! are ever contended.
//!
//! # Reclamation
//!
//! Retired segments are reclaimed through epoch-based deferral
//! (`crossbeam-epoch`): every operation runs under a pinned guard, and a
//! consumer that unlinks an exhausted head defers its destruction until no
//! pinned thread can still hold a reference. This closes the window where a
//! racing `try_peek` (or a producer holding a stale tail) could touch a
//! freed segment, and is why `try_peek` can stay a safe, concurrent call.
//!
//! # Counting
//!
//! `len` reads a global counter maintained independently of segment
//! bookkeeping with relaxed atomics; under concurrent traffic it may
//! transiently over- or under-count. That is expected and not an error.
//!
//! # Ordering guarantee
//!
//! Values pass through each slot FIFO, and slots within a segment drain in
//! order; no total order is promised across racing producers or consumers
//! beyond that.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicBool, AtomicIsize, AtomicU32, Ordering};

use crossbeam_epoch::{self as epoch, Atomic, Owned, Shared};
use crossbeam_utils::CachePadded;

/// Slots per segment.
const SEGMENT_SIZE: u32 = 32;

// Compile-time proof that the cursor domain covers the slot range.
const _: () = assert!(SEGMENT_SIZE as u64 <= u32::MAX as u64 / 2);

struct Slot<T> {
    value: UnsafeCell<MaybeUninit<T>>,
    /// Set by the producer after the value write; consumers must observe it
    /// before reading.
    ready: AtomicBool,
}

struct Segment<T> {
    slots: [Slot<T>; SEGMENT_SIZE as usize],
    /// Next slot to dequeue; only grows, never exceeds `high`.
    low: CachePadded<AtomicU32>,
    /// Next slot to enqueue; only grows, capped at `SEGMENT_SIZE`.
    high: CachePadded<AtomicU32>,
    next: Atomic<Segment<T>>,
}

impl<T> Segment<T> {
    fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Slot {
                value: UnsafeCell::new(MaybeUninit::uninit()),
                ready: AtomicBool::new(false),
            }),
            low: CachePadded::new(AtomicU32::new(0)),
            high: CachePadded::new(AtomicU32::new(0)),
            next: Atomic::null(),
        }
    }
}

/// Lock-free MPMC FIFO queue of `Copy` elements.
///
/// `enqueue` and `try_dequeue` may be called from any number of threads
/// concurrently through a shared reference. `clear` and `to_vec` take
/// `&mut self`: the exclusive borrow *is* the quiescence requirement.
pub struct ConcurrentQueue<T: Copy> {
    head: CachePadded<Atomic<Segment<T>>>,
    tail: CachePadded<Atomic<Segment<T>>>,
    /// Approximate size; see the module docs.
    count: AtomicIsize,
}

// SAFETY: values move across threads through owned slots; the protocol
// hands each slot from exactly one producer to exactly one consumer.
unsafe impl<T: Copy + Send> Send for ConcurrentQueue<T> {}
// SAFETY: all shared-reference mutation goes through atomics and the
// slot-handoff protocol above.
unsafe impl<T: Copy + Send> Sync for ConcurrentQueue<T> {}

impl<T: Copy> ConcurrentQueue<T> {
    /// Creates a queue with one empty segment.
    pub fn new() -> Self {
        let first = Owned::new(Segment::new()).into_shared(unsafe { epoch::unprotected() });
        Self {
            head: CachePadded::new(Atomic::from(first)),
            tail: CachePadded::new(Atomic::from(first)),
            count: AtomicIsize::new(0),
        }
    }

    /// Approximate number of queued values. Exact when no other thread is
    /// mutating the queue.
    #[inline]
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed).max(0) as usize
    }

    /// Best-effort emptiness check against the head segment's cursors.
    pub fn is_empty(&self) -> bool {
        let guard = epoch::pin();
        let head_ptr = self.head.load(Ordering::Acquire, &guard);
        // SAFETY: the pinned guard keeps the head segment alive.
        let head = unsafe { head_ptr.deref() };
        head.low.load(Ordering::Acquire) >= head.high.load(Ordering::Acquire)
            && head.next.load(Ordering::Acquire, &guard).is_null()
    }

    /// Queues `value`, retrying internal races until a slot is won.
    ///
    /// Never blocks on other threads' progress: every retry step either
    /// reserves a slot, links a segment, or helps swing the shared tail.
    pub fn enqueue(&self, value: T) {
        let guard = epoch::pin();
        loop {
            let tail_ptr = self.tail.load(Ordering::Acquire, &guard);
            // SAFETY: the pinned guard keeps the tail segment alive even if
            // it is concurrently retired.
            let tail = unsafe { tail_ptr.deref() };
            let high = tail.high.load(Ordering::Acquire);

            if high >= SEGMENT_SIZE {
                self.advance_tail(tail_ptr, tail, &guard);
                continue;
            }

            if tail
                .high
                .compare_exchange(high, high + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // SAFETY: winning the CAS gives this thread exclusive write
                // access to slot `high`; it is published via `ready` below.
                unsafe {
                    (*tail.slots[high as usize].value.get()).write(value);
                }
                tail.slots[high as usize].ready.store(true, Ordering::Release);
                self.count.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
    }

    /// Single-attempt enqueue: fails instead of retrying when it loses a
    /// cursor or segment-link race.
    pub fn try_enqueue(&self, value: T) -> bool {
        let guard = epoch::pin();
        let tail_ptr = self.tail.load(Ordering::Acquire, &guard);
        // SAFETY: pinned guard keeps the segment alive.
        let tail = unsafe { tail_ptr.deref() };
        let mut segment = tail;
        let mut high = tail.high.load(Ordering::Acquire);

        if high >= SEGMENT_SIZE {
            let next = tail.next.load(Ordering::Acquire, &guard);
            if next.is_null() {
                let fresh = Owned::new(Segment::new());
                match tail.next.compare_exchange(
                    Shared::null(),
                    fresh,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    &guard,
                ) {
                    Ok(linked) => {
                        let _ = self.tail.compare_exchange(
                            tail_ptr,
                            linked,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                            &guard,
                        );
                        // SAFETY: `linked` was just installed and the guard
                        // keeps it alive.
                        segment = unsafe { linked.deref() };
                        high = 0;
                    }
                    Err(lost) => {
                        // Another producer linked first; destroy the
                        // speculative segment and give up this attempt.
                        drop(lost.new);
                        return false;
                    }
                }
            } else {
                let _ = self.tail.compare_exchange(
                    tail_ptr,
                    next,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    &guard,
                );
                return false;
            }
        }

        if segment
            .high
            .compare_exchange(high, high + 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            // SAFETY: exclusive slot access as in `enqueue`.
            unsafe {
                (*segment.slots[high as usize].value.get()).write(value);
            }
            segment.slots[high as usize]
                .ready
                .store(true, Ordering::Release);
            self.count.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Dequeues the oldest available value, or returns `None` when the
    /// queue is observed empty.
    pub fn try_dequeue(&self) -> Option<T> {
        let guard = epoch::pin();
        loop {
            let head_ptr = self.head.load(Ordering::Acquire, &guard);
            // SAFETY: pinned guard keeps the head segment alive.
            let head = unsafe { head_ptr.deref() };
            let low = head.low.load(Ordering::Acquire);
            let high = head.high.load(Ordering::Acquire);

            if low >= high {
                let next = head.next.load(Ordering::Acquire, &guard);
                if next.is_null() {
                    return None;
                }
                // Exhausted segment with a successor: swing the head past
                // it. The winner retires it; reclamation waits for all
                // pinned readers.
                if self
                    .head
                    .compare_exchange(head_ptr, next, Ordering::AcqRel, Ordering::Acquire, &guard)
                    .is_ok()
                {
                    // SAFETY: the segment is unlinked and will only be
                    // destroyed after every pinned guard departs.
                    unsafe { guard.defer_destroy(head_ptr) };
                }
                continue;
            }

            if head
                .low
                .compare_exchange(low, low + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let slot = &head.slots[low as usize];
                // The producer that reserved this slot is between its CAS
                // and the ready store; wait out the publication gap.
                while !slot.ready.load(Ordering::Acquire) {
                    core::hint::spin_loop();
                }
                // SAFETY: ready was observed with Acquire, so the value
                // write happens-before this read; each slot is read once.
                let value = unsafe { (*slot.value.get()).assume_init_read() };
                self.count.fetch_sub(1, Ordering::Relaxed);
                return Some(value);
            }
        }
    }

    /// Best-effort peek at the oldest value without removing it.
    ///
    /// Reads a candidate value, then re-validates that the head segment and
    /// both cursors are unchanged; a torn observation retries rather than
    /// returning stale data. May transiently disagree with a racing
    /// consumer, and may return `None` while another thread is mid-dequeue.
    pub fn try_peek(&self) -> Option<T> {
        let guard = epoch::pin();
        loop {
            let head_ptr = self.head.load(Ordering::Acquire, &guard);
            // SAFETY: pinned guard keeps the segment alive; epoch deferral
            // guarantees even a just-retired head is still readable here.
            let mut segment = unsafe { head_ptr.deref() };
            let mut low = segment.low.load(Ordering::Acquire);
            let mut high = segment.high.load(Ordering::Acquire);

            if low >= high {
                let next = segment.next.load(Ordering::Acquire, &guard);
                if next.is_null() {
                    return None;
                }
                // SAFETY: successor is alive under the same guard.
                segment = unsafe { next.deref() };
                low = segment.low.load(Ordering::Acquire);
                high = segment.high.load(Ordering::Acquire);
                if low >= high {
                    return None;
                }
            }

            let slot = &segment.slots[low as usize];
            if !slot.ready.load(Ordering::Acquire) {
                // Reserved but not yet published; retry from the top.
                continue;
            }
            // SAFETY: ready observed with Acquire; the slot holds a value.
            // A racing consumer may read it too — the validation below
            // rejects the observation if the cursors moved.
            let value = unsafe { (*slot.value.get()).assume_init_read() };

            if core::ptr::eq(
                self.head.load(Ordering::Acquire, &guard).as_raw(),
                head_ptr.as_raw(),
            ) && segment.low.load(Ordering::Acquire) == low
                && segment.high.load(Ordering::Acquire) == high
            {
                return Some(value);
            }
        }
    }

    /// Drops every queued value and resets to one empty segment.
    ///
    /// Takes `&mut self`: callers must have quiesced all producers and
    /// consumers, and the exclusive borrow proves it.
    pub fn clear(&mut self) {
        // SAFETY: &mut self means no concurrent guard can reference these
        // segments, so immediate destruction is safe.
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.head.load(Ordering::Relaxed, guard);
            while !current.is_null() {
                let next = current.deref().next.load(Ordering::Relaxed, guard);
                drop(current.into_owned());
                current = next;
            }
            let fresh = Owned::new(Segment::new()).into_shared(guard);
            self.head = CachePadded::new(Atomic::from(fresh));
            self.tail = CachePadded::new(Atomic::from(fresh));
        }
        self.count.store(0, Ordering::Relaxed);
    }

    /// Snapshot of the queued values, head first.
    ///
    /// Takes `&mut self`: the snapshot is only meaningful when nothing is
    /// mutating the queue.
    pub fn to_vec(&mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        // SAFETY: &mut self quiesces the queue; all reserved slots are
        // published and nothing races the traversal.
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.head.load(Ordering::Relaxed, guard);
            while !current.is_null() {
                let segment = current.deref();
                let low = segment.low.load(Ordering::Relaxed);
                let high = segment.high.load(Ordering::Relaxed);
                for i in low..high {
                    out.push((*segment.slots[i as usize].value.get()).assume_init_read());
                }
                current = segment.next.load(Ordering::Relaxed, guard);
            }
        }
        out
    }

    /// Helps a full tail forward: links a fresh segment or swings the
    /// shared tail to an existing successor.
    fn advance_tail<'g>(
        &self,
        tail_ptr: Shared<'g, Segment<T>>,
        tail: &Segment<T>,
        guard: &'g epoch::Guard,
    ) {
        let next = tail.next.load(Ordering::Acquire, guard);
        if next.is_null() {
            let fresh = Owned::new(Segment::new());
            match tail.next.compare_exchange(
                Shared::null(),
                fresh,
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(linked) => {
                    let _ = self.tail.compare_exchange(
                        tail_ptr,
                        linked,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                        guard,
                    );
                }
                Err(lost) => {
                    // Another producer linked first; destroy the
                    // speculative segment and help swing instead.
                    drop(lost.new);
                    let next = tail.next.load(Ordering::Acquire, guard);
                    if !next.is_null() {
                        let _ = self.tail.compare_exchange(
                            tail_ptr,
                            next,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                            guard,
                        );
                    }
                }
            }
        } else {
            let _ = self.tail.compare_exchange(
                tail_ptr,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            );
        }
    }
}

impl<T: Copy> Drop for ConcurrentQueue<T> {
    fn drop(&mut self) {
        // SAFETY: &mut self (by Drop) means no other reference exists;
        // destroy the whole segment chain immediately.
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.head.load(Ordering::Relaxed, guard);
            while !current.is_null() {
                let next = current.deref().next.load(Ordering::Relaxed, guard);
                drop(current.into_owned());
                current = next;
            }
        }
    }
}

impl<T: Copy> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "mpmc_tests.rs"]
mod mpmc_tests;
