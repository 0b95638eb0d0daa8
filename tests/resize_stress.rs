//! Growth stress: contents must survive arbitrary numbers of internal
//! reallocation events, for every container with a growth policy.

use rawcol::{RawDeque, RawMap, RawPriorityQueue, RawSet, RawVec, SparseSet};

const STRESS_N: u64 = 100_000;

#[test]
fn map_keeps_every_entry_across_resizes() {
    let mut map = RawMap::new();
    for k in 0..STRESS_N {
        map.insert(k, k.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    }
    assert_eq!(map.len(), STRESS_N as usize);
    for k in 0..STRESS_N {
        assert_eq!(
            map.get(&k).copied(),
            Some(k.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
            "key {k} lost or corrupted"
        );
    }
}

#[test]
fn map_reuses_slots_through_churn() {
    // Insert/remove churn at constant live size must not grow the table
    // without bound: vacated slots feed the free list first.
    let mut map = RawMap::new();
    for k in 0..1_000u64 {
        map.insert(k, k);
    }
    let settled_capacity = {
        // One churn round may still trigger the growth that accommodates
        // the steady-state size; measure after it.
        for k in 0..1_000u64 {
            map.remove(&k);
            map.insert(k + 1_000_000, k);
        }
        map.capacity()
    };
    for round in 1..50u64 {
        let base = round * 1_000_000;
        for k in 0..1_000u64 {
            assert!(map.remove(&(k + base)), "entry from round {round} missing");
            map.insert(k + base + 1_000_000, k);
        }
    }
    assert_eq!(map.capacity(), settled_capacity, "churn leaked slots");
    assert_eq!(map.len(), 1_000);
}

#[test]
fn set_membership_across_resizes() {
    let mut set = RawSet::new();
    for v in 0..STRESS_N {
        set.insert(v.wrapping_mul(2_654_435_761));
    }
    assert_eq!(set.len(), STRESS_N as usize);
    for v in 0..STRESS_N {
        assert!(set.contains(&v.wrapping_mul(2_654_435_761)));
    }
}

#[test]
fn vec_contents_across_growth() {
    let mut v = RawVec::new();
    for i in 0..STRESS_N {
        v.push(i);
    }
    assert_eq!(v.len(), STRESS_N as usize);
    for i in (0..STRESS_N).step_by(997) {
        assert_eq!(v[i as usize], i);
    }
    assert_eq!(*v.last().unwrap(), STRESS_N - 1);
}

#[test]
fn deque_fifo_across_many_growths() {
    let mut d = RawDeque::with_capacity(2);
    let mut next_out = 0u64;
    for i in 0..STRESS_N {
        d.push_back(i);
        if i % 2 == 1 {
            assert_eq!(d.pop_front(), next_out);
            next_out += 1;
        }
    }
    while let Some(v) = d.try_pop_front() {
        assert_eq!(v, next_out);
        next_out += 1;
    }
    assert_eq!(next_out, STRESS_N);
}

#[test]
fn heap_drains_sorted_after_bulk_load() {
    let mut q = RawPriorityQueue::new();
    let mut x = 0x2545_F491_4F6C_DD1Du64;
    for _ in 0..50_000 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        q.enqueue((), x);
    }
    let mut previous = 0u64;
    let mut drained = 0usize;
    while let Some((p, ())) = q.dequeue_entry() {
        assert!(p >= previous, "heap order violated");
        previous = p;
        drained += 1;
    }
    assert_eq!(drained, 50_000);
}

#[test]
fn sparse_set_wide_key_span() {
    let mut s = SparseSet::new();
    for k in (0..200_000u32).step_by(7) {
        s.insert(k, k as u64 * 3);
    }
    let inserted = (0..200_000u32).step_by(7).count();
    assert_eq!(s.len(), inserted);
    for k in (0..200_000u32).step_by(7) {
        assert_eq!(s.get(k), Some(&(k as u64 * 3)));
    }
    assert!(!s.contains_key(1)); // 1 is not a multiple of 7
}
