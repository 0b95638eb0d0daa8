//! Allocator boundary: aligned allocate/free, alignment queries, and the
//! marker traits the byte-level operations rely on.
//!
//! The containers in this crate never touch the global allocator directly;
//! everything goes through [`aligned_alloc`] / [`aligned_free`] so the
//! allocation discipline (alignment correctness, non-null on success,
//! pressure accounting) lives in exactly one place.
//!
//! # Invariants
//! - [`aligned_alloc`] is only called with non-zero-size layouts; zero-byte
//!   buffers are represented as dangling pointers upstream and never reach
//!   the allocator.
//! - A block returned by [`aligned_alloc`] must be released with
//!   [`aligned_free`] and the same layout.
//! - Allocation failure is not reported to callers; it is routed to
//!   [`handle_alloc_error`], the allocator's own error channel.
//!
//! We avoid external "bytemuck"-style dependencies here so the invariants
//! behind [`Pod`] and [`Zeroable`] are visible at the call site and easy to
//! audit.

use core::mem::{align_of, size_of};
use std::alloc::{alloc, alloc_zeroed, dealloc, handle_alloc_error, Layout};

// Compile-time proof that u32 -> usize is safe on this platform.
// This fails to compile on 16-bit platforms.
const _: () = assert!(
    size_of::<usize>() >= size_of::<u32>(),
    "Platform must have at least 32-bit addressing"
);

/// # Safety
///
/// Implementers guarantee the type has no padding bytes and all bytes are
/// initialized for any valid value, and that *any* bit pattern of the right
/// size is a valid value. This makes it safe to reinterpret buffers of one
/// `Pod` type as another.
pub unsafe trait Pod: Copy {}

/// # Safety
///
/// Implementers guarantee the all-zero byte pattern is a valid value. This is
/// stronger than `Default` and is required for the zeroed allocation paths.
pub unsafe trait Zeroable {}

unsafe impl Pod for u8 {}
unsafe impl Pod for u16 {}
unsafe impl Pod for u32 {}
unsafe impl Pod for u64 {}
unsafe impl Pod for u128 {}
unsafe impl Pod for usize {}
unsafe impl Pod for i8 {}
unsafe impl Pod for i16 {}
unsafe impl Pod for i32 {}
unsafe impl Pod for i64 {}
unsafe impl Pod for i128 {}
unsafe impl Pod for isize {}
unsafe impl Pod for f32 {}
unsafe impl Pod for f64 {}
unsafe impl<T: Pod, const N: usize> Pod for [T; N] {}

unsafe impl Zeroable for bool {}
unsafe impl Zeroable for u8 {}
unsafe impl Zeroable for u16 {}
unsafe impl Zeroable for u32 {}
unsafe impl Zeroable for u64 {}
unsafe impl Zeroable for u128 {}
unsafe impl Zeroable for usize {}
unsafe impl Zeroable for i8 {}
unsafe impl Zeroable for i16 {}
unsafe impl Zeroable for i32 {}
unsafe impl Zeroable for i64 {}
unsafe impl Zeroable for i128 {}
unsafe impl Zeroable for isize {}
unsafe impl Zeroable for f32 {}
unsafe impl Zeroable for f64 {}
unsafe impl<T: Zeroable, const N: usize> Zeroable for [T; N] {}

/// Returns the natural alignment requirement of `T`.
///
/// Thin wrapper so call sites read as allocator-contract operations.
#[inline(always)]
pub const fn alignment_of<T>() -> usize {
    align_of::<T>()
}

/// Rounds `value` up to the next multiple of `align`.
///
/// # Panics
/// Debug builds panic if `align` is not a power of two.
#[inline]
pub const fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + (align - 1)) & !(align - 1)
}

/// Computes the smallest forward byte offset that aligns the start of
/// `region` for element type `T`.
///
/// The result is at most `align_of::<T>() - 1` and may exceed
/// `region.len()` only in the degenerate case of a region shorter than the
/// alignment padding; callers must bounds-check against the region length.
#[inline]
pub fn aligned_prefix<T>(region: &[u8]) -> usize {
    let addr = region.as_ptr() as usize;
    align_up(addr, alignment_of::<T>()) - addr
}

/// Allocates an uninitialized block for `layout`.
///
/// Never returns null: allocation failure diverts to [`handle_alloc_error`].
///
/// # Panics
/// Panics if `layout.size() == 0`; zero-size blocks never reach the
/// allocator.
#[inline]
pub fn aligned_alloc(layout: Layout) -> *mut u8 {
    assert!(layout.size() > 0, "zero-size allocation request");
    // SAFETY: layout has non-zero size, checked above.
    let ptr = unsafe { alloc(layout) };
    if ptr.is_null() {
        handle_alloc_error(layout);
    }
    pressure::add(layout.size());
    ptr
}

/// Allocates a zero-initialized block for `layout`.
///
/// Same contract as [`aligned_alloc`].
#[inline]
pub fn aligned_alloc_zeroed(layout: Layout) -> *mut u8 {
    assert!(layout.size() > 0, "zero-size allocation request");
    // SAFETY: layout has non-zero size, checked above.
    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        handle_alloc_error(layout);
    }
    pressure::add(layout.size());
    ptr
}

/// Releases a block previously returned by [`aligned_alloc`] or
/// [`aligned_alloc_zeroed`] with the same `layout`.
///
/// # Safety
/// `ptr` must come from this module's allocation functions with exactly this
/// `layout`, and must not be freed twice.
#[inline]
pub unsafe fn aligned_free(ptr: *mut u8, layout: Layout) {
    debug_assert!(!ptr.is_null());
    debug_assert!(layout.size() > 0);
    pressure::remove(layout.size());
    // SAFETY: caller contract.
    unsafe { dealloc(ptr, layout) };
}

/// Informational live-byte accounting.
///
/// Enabled with the `mem-pressure` feature; every hook is a no-op otherwise.
/// Counters use relaxed atomics for low overhead; snapshots are best-effort
/// and intended for coarse diagnostics rather than exact accounting. This is
/// telemetry, never a correctness mechanism.
pub mod pressure {
    #[cfg(feature = "mem-pressure")]
    use std::sync::atomic::{AtomicU64, Ordering};

    #[cfg(feature = "mem-pressure")]
    static LIVE_BYTES: AtomicU64 = AtomicU64::new(0);
    #[cfg(feature = "mem-pressure")]
    static TOTAL_ALLOCS: AtomicU64 = AtomicU64::new(0);
    #[cfg(feature = "mem-pressure")]
    static TOTAL_FREES: AtomicU64 = AtomicU64::new(0);

    /// Snapshot of the allocation counters.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PressureStats {
        /// Bytes currently allocated through the boundary.
        pub live_bytes: u64,
        /// Number of allocations since start (or last [`reset`]).
        pub total_allocs: u64,
        /// Number of frees since start (or last [`reset`]).
        pub total_frees: u64,
    }

    #[cfg(feature = "mem-pressure")]
    #[inline]
    pub(super) fn add(bytes: usize) {
        LIVE_BYTES.fetch_add(bytes as u64, Ordering::Relaxed);
        TOTAL_ALLOCS.fetch_add(1, Ordering::Relaxed);
    }

    #[cfg(feature = "mem-pressure")]
    #[inline]
    pub(super) fn remove(bytes: usize) {
        LIVE_BYTES.fetch_sub(bytes as u64, Ordering::Relaxed);
        TOTAL_FREES.fetch_add(1, Ordering::Relaxed);
    }

    #[cfg(not(feature = "mem-pressure"))]
    #[inline(always)]
    pub(super) fn add(_bytes: usize) {}

    #[cfg(not(feature = "mem-pressure"))]
    #[inline(always)]
    pub(super) fn remove(_bytes: usize) {}

    /// Snapshot current counters. Zeroed when the feature is disabled.
    #[inline]
    pub fn snapshot() -> PressureStats {
        #[cfg(feature = "mem-pressure")]
        {
            PressureStats {
                live_bytes: LIVE_BYTES.load(Ordering::Relaxed),
                total_allocs: TOTAL_ALLOCS.load(Ordering::Relaxed),
                total_frees: TOTAL_FREES.load(Ordering::Relaxed),
            }
        }
        #[cfg(not(feature = "mem-pressure"))]
        {
            PressureStats::default()
        }
    }

    /// Reset all counters to zero.
    #[inline]
    pub fn reset() {
        #[cfg(feature = "mem-pressure")]
        {
            LIVE_BYTES.store(0, Ordering::Relaxed);
            TOTAL_ALLOCS.store(0, Ordering::Relaxed);
            TOTAL_FREES.store(0, Ordering::Relaxed);
        }
    }
}
