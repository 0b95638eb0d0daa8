//! BitArray tests: single/range mutation, population counts, element-wise
//! algebra against equal-length operands, and capacity management.

use super::*;
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 16;

#[test]
fn new_is_all_false() {
    let b = BitArray::new(10);
    assert_eq!(b.len(), 10);
    assert!(b.none());
    assert!(!b.any());
    assert_eq!(b.count_true(), 0);
    assert_eq!(b.count_false(), 10);
}

#[test]
#[should_panic(expected = "length must be positive")]
fn zero_length_rejected() {
    let _ = BitArray::new(0);
}

#[test]
fn set_get_flip_single() {
    let mut b = BitArray::new(8);
    b.set(3, true);
    assert!(b.get(3));
    assert!(!b.get(2));
    b.flip(3);
    assert!(!b.get(3));
    b.flip(0);
    assert!(b.get(0));
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn get_past_len_panics() {
    let b = BitArray::new(4);
    b.get(4);
}

#[test]
fn set_range_and_counts() {
    let mut b = BitArray::new(16);
    b.set_range(4, 8, true);
    assert_eq!(b.count_true(), 8);
    assert!(!b.get(3));
    assert!(b.get(4));
    assert!(b.get(11));
    assert!(!b.get(12));
    b.set_range(6, 2, false);
    assert_eq!(b.count_true(), 6);
}

#[test]
#[should_panic(expected = "out of range")]
fn set_range_past_len_panics() {
    let mut b = BitArray::new(4);
    b.set_range(2, 3, true);
}

#[test]
fn set_all_drives_all_and_none() {
    let mut b = BitArray::new(12);
    b.set_all(true);
    assert!(b.all());
    assert!(!b.none());
    assert_eq!(b.count_true(), 12);
    b.set_all(false);
    assert!(!b.all());
    assert!(b.none());
}

#[test]
fn and_or_xor_elementwise() {
    let mut a = BitArray::from_slice(&[true, true, false, false]);
    let b = BitArray::from_slice(&[true, false, true, false]);

    let mut and = a.clone();
    and.and(&b);
    assert_eq!(and.to_vec(), vec![true, false, false, false]);

    let mut or = a.clone();
    or.or(&b);
    assert_eq!(or.to_vec(), vec![true, true, true, false]);

    a.xor(&b);
    assert_eq!(a.to_vec(), vec![false, true, true, false]);
}

#[test]
#[should_panic(expected = "length mismatch")]
fn algebra_rejects_length_mismatch() {
    let mut a = BitArray::new(4);
    let b = BitArray::new(5);
    a.and(&b);
}

#[test]
fn double_not_is_identity() {
    let mut b = BitArray::from_slice(&[true, false, true, true, false]);
    let original = b.clone();
    b.not();
    assert_ne!(b, original);
    b.not();
    assert_eq!(b, original);
}

#[test]
fn slice_copies_range() {
    let b = BitArray::from_slice(&[true, false, true, false, true]);
    let s = b.slice(1, 3);
    assert_eq!(s.to_vec(), vec![false, true, false]);
}

#[test]
fn ensure_capacity_then_extend() {
    let mut b = BitArray::new(4);
    b.set_all(true);
    b.ensure_capacity(64);
    assert!(b.capacity() >= 64);
    assert_eq!(b.len(), 4);
    assert!(b.all()); // existing flags untouched
    b.extend(4, false);
    assert_eq!(b.len(), 8);
    assert_eq!(b.count_true(), 4);
}

#[test]
fn trim_excess_drops_spare_capacity() {
    let mut b = BitArray::new(8);
    b.ensure_capacity(128);
    b.trim_excess();
    assert_eq!(b.capacity(), 8);
    assert_eq!(b.len(), 8);
}

#[test]
fn copy_to_and_to_vec() {
    let b = BitArray::from_slice(&[true, false, true]);
    let mut dest = [false; 4];
    b.copy_to(&mut dest);
    assert_eq!(dest, [true, false, true, false]);
    assert_eq!(b.to_vec(), vec![true, false, true]);
}

#[test]
fn from_bytes_reads_low_bits() {
    let region = [0u8, 1, 2, 3, 0xFF];
    let (offset, b) = BitArray::from_bytes(&region).unwrap();
    assert_eq!(offset, 0);
    assert_eq!(b.to_vec(), vec![false, true, false, true, true]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(
        crate::test_utils::proptest_cases(PROPTEST_CASES)
    ))]

    /// The AND population count never exceeds either operand's, and
    /// double-NOT is the identity.
    #[test]
    fn algebra_properties(
        pairs in prop::collection::vec((any::<bool>(), any::<bool>()), 1..256)
    ) {
        let a_vals: Vec<bool> = pairs.iter().map(|&(a, _)| a).collect();
        let b_vals: Vec<bool> = pairs.iter().map(|&(_, b)| b).collect();
        let a = BitArray::from_slice(&a_vals);
        let b = BitArray::from_slice(&b_vals);

        let mut anded = a.clone();
        anded.and(&b);
        prop_assert!(anded.count_true() <= a.count_true().min(b.count_true()));

        let mut double_not = a.clone();
        double_not.not();
        double_not.not();
        prop_assert_eq!(&double_not, &a);

        // XOR with itself clears everything.
        let mut self_xor = a.clone();
        let a_copy = a.clone();
        self_xor.xor(&a_copy);
        prop_assert!(self_xor.none());
    }

    /// count_true + count_false always equals the length.
    #[test]
    fn counts_partition_length(values in prop::collection::vec(any::<bool>(), 1..200)) {
        let b = BitArray::from_slice(&values);
        prop_assert_eq!(b.count_true() + b.count_false(), b.len());
        prop_assert_eq!(b.any(), values.iter().any(|&v| v));
        prop_assert_eq!(b.all(), values.iter().all(|&v| v));
    }
}
