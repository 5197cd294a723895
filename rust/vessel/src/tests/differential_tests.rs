use vessel_testkit::{DropTally, Droppable, TrackingAllocator};

use crate::Vector;

/// Applies the same random operation stream to a `Vector` and a `Vec` and
/// checks that they agree after every step, including on which calls fail.
fn run_differential(seed: u64, steps: usize) {
    fastrand::seed(seed);
    let alloc = TrackingAllocator::new();
    let mut actual = Vector::new_in(alloc.clone());
    let mut expected: Vec<u32> = Vec::new();

    for _ in 0..steps {
        let len = expected.len();
        match fastrand::u8(0..10) {
            0..=2 => {
                let value = fastrand::u32(..);
                actual.push_back(value).unwrap();
                expected.push(value);
            }
            3 => {
                let popped = actual.pop_back().ok();
                assert_eq!(popped, expected.pop());
            }
            4 => {
                let index = fastrand::usize(0..=len + 1);
                let value = fastrand::u32(..);
                let result = actual.insert(value, index);
                if index <= len {
                    result.unwrap();
                    expected.insert(index, value);
                } else {
                    assert!(result.unwrap_err().is_out_of_range());
                }
            }
            5 => {
                let index = fastrand::usize(0..=len);
                let result = actual.erase(index);
                if index < len {
                    assert_eq!(result.unwrap(), expected.remove(index));
                } else {
                    assert!(result.is_err());
                }
            }
            6 => {
                let first = fastrand::usize(0..=len);
                let last = fastrand::usize(0..=len);
                let result = actual.erase_range(first, last);
                if first <= last {
                    result.unwrap();
                    expected.drain(first..last).for_each(drop);
                } else {
                    assert!(result.is_err());
                }
            }
            7 => {
                let index = fastrand::usize(0..=len);
                assert_eq!(actual.at(index).ok(), expected.get(index));
            }
            8 => match fastrand::u8(0..4) {
                0 => {
                    actual.shrink_to_fit().unwrap();
                    assert_eq!(actual.capacity(), len);
                }
                1 => {
                    let target = fastrand::usize(0..len * 2 + 4);
                    actual.reserve(target).unwrap();
                    assert!(actual.capacity() >= target);
                }
                2 => {
                    if fastrand::u8(0..8) == 0 {
                        actual.clear();
                        expected.clear();
                    }
                }
                _ => {
                    let extra: Vec<u32> = (0..fastrand::usize(0..6))
                        .map(|_| fastrand::u32(..))
                        .collect();
                    actual.extend_from_slice(&extra).unwrap();
                    expected.extend_from_slice(&extra);
                }
            },
            _ => {
                let needle = fastrand::u32(..);
                let sought = expected
                    .get(fastrand::usize(0..=len))
                    .copied()
                    .unwrap_or(needle);
                assert_eq!(actual.find(&sought), expected.contains(&sought));
                assert_eq!(
                    actual.index_of(&sought),
                    expected.iter().position(|&x| x == sought)
                );
            }
        }

        assert_eq!(actual.as_slice(), expected.as_slice());
        assert!(actual.len() <= actual.capacity());
    }

    drop(actual);
    let stats = alloc.stats();
    assert_eq!(stats.live_allocations, 0);
    assert_eq!(stats.constructed_bytes, stats.destroyed_bytes);
}

#[test]
fn test_matches_std_vec_short_runs() {
    for seed in 0..50 {
        run_differential(seed, 200);
    }
}

#[test]
fn test_matches_std_vec_long_run() {
    run_differential(7_341_209, 20_000);
}

#[test]
fn test_every_element_dropped_exactly_once() {
    fastrand::seed(90_125);
    let tally = DropTally::new();
    let mut created = 0usize;
    let mut removed: Vec<Droppable> = Vec::new();
    let mut v = Vector::new();

    for _ in 0..5_000 {
        match fastrand::u8(0..5) {
            0 | 1 => {
                v.push_back(tally.make(created as i32)).unwrap();
                created += 1;
            }
            2 if !v.is_empty() => {
                let index = fastrand::usize(0..v.len());
                removed.push(v.erase(index).unwrap());
            }
            3 if v.len() > 2 => {
                let first = fastrand::usize(0..v.len() / 2);
                v.erase_range(first, first + 2).unwrap();
            }
            _ => {
                let index = fastrand::usize(0..=v.len());
                v.insert(tally.make(created as i32), index).unwrap();
                created += 1;
            }
        }
    }

    let live = v.len() + removed.len();
    assert_eq!(tally.drops(), created - live);
    drop(v);
    drop(removed);
    assert_eq!(tally.drops(), created);
}
