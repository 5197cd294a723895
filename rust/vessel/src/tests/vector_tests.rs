use std::hash::{BuildHasher, RandomState};

use crate::{DEFAULT_CAPACITY, ErrorKind, Vector, vector};

fn zero_to_nine() -> Vector<i32> {
    let mut v = Vector::new();
    for i in 0..10 {
        v.push_back(i).unwrap();
    }
    v
}

#[test]
fn test_push_pop_clear_sequence() {
    let mut v = zero_to_nine();
    assert_eq!(v.len(), 10);
    assert_eq!(*v.at(0).unwrap(), 0);
    assert_eq!(*v.at(9).unwrap(), 9);

    for _ in 0..5 {
        v.pop_back().unwrap();
    }
    assert_eq!(v.len(), 5);
    assert_eq!(*v.at(4).unwrap(), 4);

    let capacity = v.capacity();
    v.clear();
    assert_eq!(v.len(), 0);
    assert_eq!(v.capacity(), capacity);
    v.push_back(42).unwrap();
    assert_eq!(*v.at(0).unwrap(), 42);
}

#[test]
fn test_insert_then_erase_range() {
    let mut v = vector![0, 1, 2, 3, 4];
    v.insert(99, 2).unwrap();
    assert_eq!(v, [0, 1, 99, 2, 3, 4]);

    // Half-open: removes indices 1 and 2.
    let mut w = v.clone();
    w.erase_range(1, 3).unwrap();
    assert_eq!(w, [0, 2, 3, 4]);

    v.erase_range(1, 4).unwrap();
    assert_eq!(v, [0, 3, 4]);
}

#[test]
fn test_pop_back_on_empty_is_underflow() {
    let mut v = Vector::<String>::new();
    let err = v.pop_back().unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::Underflow {
            operation: "pop_back"
        }
    );
    assert!(v.is_empty());
    assert!(v.back().is_err());
    assert!(v.front().is_err());
}

#[test]
fn test_bounds() {
    let mut v = vector![1, 2, 3];
    let len = v.len();

    let err = v.at(len).unwrap_err();
    assert!(err.is_out_of_range());
    assert_eq!(err.kind(), &ErrorKind::OutOfRange { index: 3, len: 3 });
    assert!(v.insert(7, len + 1).unwrap_err().is_out_of_range());
    assert_eq!(v, [1, 2, 3]);

    assert_eq!(*v.at(len - 1).unwrap(), 3);
    v.insert(4, len).unwrap();
    assert_eq!(v, [1, 2, 3, 4]);
    assert!(v.erase(4).unwrap_err().is_out_of_range());
    assert!(v.at_mut(10).is_err());
}

#[test]
fn test_push_then_pop_restores_state() {
    let mut v = vector![5, 6, 7];
    v.push_back(8).unwrap();
    assert_eq!(v.pop_back().unwrap(), 8);
    assert_eq!(v, [5, 6, 7]);
}

#[test]
fn test_insert_then_erase_restores_sequence() {
    let original = vector!["a", "b", "c", "d"];
    for i in 0..=original.len() {
        let mut v = original.clone();
        v.insert("x", i).unwrap();
        assert_eq!(v[i], "x");
        assert_eq!(v.erase(i).unwrap(), "x");
        assert_eq!(v, original);
    }
}

#[test]
fn test_len_never_exceeds_capacity() {
    let mut v = Vector::new();
    for i in 0..1000u32 {
        v.push_back(i).unwrap();
        assert!(v.len() <= v.capacity());
        if i % 7 == 0 {
            v.erase(v.len() / 2).unwrap();
            assert!(v.len() <= v.capacity());
        }
    }
    v.shrink_to_fit().unwrap();
    assert_eq!(v.len(), v.capacity());
}

#[test]
fn test_constructors() {
    let empty = Vector::<u64>::new();
    assert_eq!(empty.capacity(), 0);
    assert!(empty.is_empty());

    let small = Vector::<u64>::with_default_capacity().unwrap();
    assert_eq!(small.capacity(), DEFAULT_CAPACITY);
    assert_eq!(small.len(), 0);

    let sized = Vector::<u64>::with_capacity(12).unwrap();
    assert_eq!(sized.capacity(), 12);

    let defaults = Vector::<i32>::with_len(3).unwrap();
    assert_eq!(defaults, [0, 0, 0]);

    let copies = Vector::from_elem("ab".to_string(), 3).unwrap();
    assert_eq!(copies, ["ab", "ab", "ab"]);
    assert_eq!(Vector::from_elem(1u8, 0).unwrap().capacity(), 0);

    let from_slice = Vector::from_slice(&[1.5, 2.5]).unwrap();
    assert_eq!(from_slice, [1.5, 2.5]);

    let collected: Vector<_> = (0..4).map(|i| i * i).collect();
    assert_eq!(collected, [0, 1, 4, 9]);

    let default: Vector<char> = Default::default();
    assert!(default.is_empty());
}

#[test]
fn test_copy_is_independent() {
    let mut original = vector![String::from("x"), String::from("y")];
    let mut copy = original.try_clone().unwrap();
    copy.push_back("z".into()).unwrap();
    original[0].push('!');
    assert_eq!(original, ["x!", "y"]);
    assert_eq!(copy, ["x", "y", "z"]);
    assert_ne!(original.as_ptr(), copy.as_ptr());
}

#[test]
fn test_take_from_leaves_source_empty() {
    let mut source = zero_to_nine();
    let ptr = source.as_ptr();
    let moved = Vector::take_from(&mut source);
    assert_eq!(source.len(), 0);
    assert_eq!(source.capacity(), 0);
    assert_eq!(moved.as_ptr(), ptr);
    assert!(moved.iter().copied().eq(0..10));

    // The source stays usable.
    source.push_back(1).unwrap();
    assert_eq!(source, [1]);
}

#[test]
fn test_assign_from_and_assign_take() {
    let source = vector![1, 2, 3];
    let mut target = vector![9; 10];
    target.assign_from(&source).unwrap();
    assert_eq!(target, source);
    assert_eq!(target.capacity(), 3);

    let mut donor = vector![4, 5];
    target.assign_take(&mut donor).unwrap();
    assert_eq!(target, [4, 5]);
    assert!(donor.is_empty());
    assert_eq!(donor.capacity(), 0);

    let mut clone_target = vector![0];
    clone_target.clone_from(&source);
    assert_eq!(clone_target, [1, 2, 3]);
}

#[test]
fn test_reserve_and_shrink_to_fit() {
    let mut v = vector![1u16, 2, 3];
    v.reserve(2).unwrap();
    assert_eq!(v.capacity(), 3);
    v.reserve(40).unwrap();
    assert_eq!(v.capacity(), 40);
    assert_eq!(v, [1, 2, 3]);
    v.shrink_to_fit().unwrap();
    assert_eq!(v.capacity(), 3);
    v.clear();
    v.shrink_to_fit().unwrap();
    assert_eq!(v.capacity(), 0);
}

#[test]
fn test_reserve_beyond_max_is_length_error() {
    let mut v = Vector::<u64>::new();
    let err = v.reserve(usize::MAX).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::LengthError { .. }));
    assert_eq!(v.capacity(), 0);
    assert_eq!(v.max_len(), isize::MAX as usize / 8);
}

#[test]
fn test_find_and_index_of() {
    let v = vector![3, 1, 4, 1, 5];
    assert!(v.find(&4));
    assert!(!v.find(&9));
    assert_eq!(v.index_of(&1), Some(1));
    assert_eq!(v.index_of(&5), Some(4));
    assert_eq!(v.index_of(&2), None);
}

#[test]
fn test_erase_range_validation() {
    let mut v = vector![1, 2, 3, 4];
    let err = v.erase_range(3, 2).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::InvalidRange {
            first: 3,
            last: 2,
            len: 4
        }
    );
    assert!(err.is_out_of_range());
    assert!(v.erase_range(0, 5).is_err());
    v.erase_range(2, 2).unwrap();
    assert_eq!(v, [1, 2, 3, 4]);
    v.erase_range(0, 4).unwrap();
    assert!(v.is_empty());
}

#[test]
fn test_erase_returns_removed_value() {
    let mut v = vector!["a".to_string(), "b".to_string(), "c".to_string()];
    assert_eq!(v.erase(1).unwrap(), "b");
    assert_eq!(v, ["a", "c"]);
    assert_eq!(v.erase(1).unwrap(), "c");
    assert_eq!(v.erase(0).unwrap(), "a");
    assert!(v.erase(0).is_err());
}

#[test]
fn test_emplace_back_returns_new_element() {
    let mut v = Vector::new();
    let slot = v.emplace_back(|| vec![1, 2]).unwrap();
    slot.push(3);
    assert_eq!(v.back().unwrap(), &[1, 2, 3]);
}

#[test]
fn test_front_and_back() {
    let mut v = vector![1, 2, 3];
    assert_eq!(*v.front().unwrap(), 1);
    assert_eq!(*v.back().unwrap(), 3);
    *v.front_mut().unwrap() = 10;
    *v.back_mut().unwrap() = 30;
    assert_eq!(v, [10, 2, 30]);
}

#[test]
fn test_extend() {
    let mut v = vector![1];
    v.extend_from_slice(&[2, 3]).unwrap();
    v.try_extend(4..6).unwrap();
    v.extend([6, 7].iter());
    v.extend(vec![8]);
    assert!(v.iter().copied().eq(1..=8));
}

#[test]
fn test_zero_sized_elements() {
    let mut v = Vector::new();
    for _ in 0..100 {
        v.push_back(()).unwrap();
    }
    assert_eq!(v.len(), 100);
    assert_eq!(v.capacity(), usize::MAX);
    v.insert((), 50).unwrap();
    v.erase_range(0, 40).unwrap();
    assert_eq!(v.len(), 61);
    assert_eq!(v.into_iter().count(), 61);
}

#[test]
fn test_equality_hash_and_debug() {
    let a = vector![1, 2, 3];
    let b = Vector::from_slice(&[1, 2, 3]).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, &[1, 2, 3][..]);
    assert_ne!(a, [1, 2]);

    let state = RandomState::new();
    assert_eq!(state.hash_one(&a), state.hash_one(&[1, 2, 3][..]));
    assert_eq!(format!("{a:?}"), "[1, 2, 3]");
}

#[test]
fn test_slice_access_through_deref() {
    let mut v = vector![4, 2, 3, 1];
    v.sort_unstable();
    assert_eq!(v, [1, 2, 3, 4]);
    assert_eq!(&v[1..3], &[2, 3]);
    assert_eq!(v.iter().rev().copied().collect::<Vec<_>>(), [4, 3, 2, 1]);
    for x in &mut v {
        *x *= 2;
    }
    assert_eq!(unsafe { *v.get_unchecked(3) }, 8);
}

#[test]
#[should_panic]
fn test_index_out_of_bounds_panics() {
    let v = vector![1, 2, 3];
    let _ = v[3];
}

#[cfg(feature = "bytemuck")]
#[test]
fn test_as_bytes() {
    let v = vector![0x0102u16, 0x0304];
    let bytes = v.as_bytes();
    assert_eq!(bytes.len(), 4);
    assert_eq!(u16::from_ne_bytes([bytes[2], bytes[3]]), 0x0304);
}
