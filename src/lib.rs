//! Allocator-backed generic containers for plain-data types.
//!
//! Every container in this crate owns (or, for views, borrows) a block of
//! aligned heap memory that it allocates, grows, and frees itself. Values are
//! stored in-place by bitwise copy; there is no garbage collector, no
//! reference counting, and no implicit reclamation anywhere.
//!
//! ## Element discipline
//! - All containers require `T: Copy` — fixed-size, pointer-free values.
//! - Byte-reinterpreting operations (`cast`, external-region construction)
//!   additionally require the crate's own [`Pod`](alloc::Pod) marker.
//! - Zero-initialized allocation paths require [`Zeroable`](alloc::Zeroable).
//!
//! ## Lifecycle
//! Backing storage lives in [`RawBuf`](raw_buf::RawBuf), an owned,
//! bounds-tracked aligned buffer whose destructor frees exactly once.
//! Dropping a container is its disposal; the consuming `dispose()` methods
//! exist to make that explicit at call sites. Use-after-dispose is therefore
//! a compile error, not a runtime check.
//!
//! ## Thread safety
//! Only [`ConcurrentQueue`] supports concurrent mutation. Every other
//! container assumes a single writer; the hash engine additionally carries a
//! collision-count guard that panics on *some* (not all) cross-thread
//! corruption it happens to observe.
//!
//! ## Error model
//! Programming errors (out-of-bounds indices, duplicate `insert`, popping an
//! empty container through the panicking form) fail fast with a panic and no
//! partial effects. Expected absence is an `Option` via the `try_*`/`get`
//! forms. The only `Result` surface is construction over caller-supplied
//! byte regions, which can fail with [`RegionError`](error::RegionError).

pub mod alloc;
pub mod array;
pub mod bits;
pub mod deque;
pub mod error;
pub mod linked;
pub mod map;
pub mod mpmc;
pub mod pqueue;
pub mod primes;
pub mod queue;
pub mod raw_buf;
pub mod set;
pub mod sparse;
pub mod stack;
mod table;
pub mod vec;

#[cfg(test)]
pub mod test_utils;

pub use array::{ArrayView, RawArray};
pub use bits::BitArray;
pub use deque::RawDeque;
pub use error::RegionError;
pub use linked::RawLinkedList;
pub use map::RawMap;
pub use mpmc::ConcurrentQueue;
pub use pqueue::RawPriorityQueue;
pub use queue::RawQueue;
pub use set::RawSet;
pub use sparse::{InsertOutcome, SparseEntry, SparseSet};
pub use stack::RawStack;
pub use vec::RawVec;
