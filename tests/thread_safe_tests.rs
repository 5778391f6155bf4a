//! Integration tests for thread-safe use of `PersistentAvlSet`.
//!
//! These tests verify that sets and their forks can be read from multiple
//! threads with the `arc` feature enabled, while further forks keep being
//! mutated elsewhere.

#![cfg(feature = "arc")]

use arbors::PersistentAvlSet;
use rstest::rstest;
use std::thread;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Marked {
    value: i32,
    mark: u8,
}

fn marked_set(values: std::ops::Range<i32>, mark: u8) -> Vec<Marked> {
    values.map(|value| Marked { value, mark }).collect()
}

fn assert_exact_contents(set: &PersistentAvlSet<Marked>, expected: &[(std::ops::Range<i32>, u8)]) {
    let mut remaining: Vec<Marked> = set.iter().cloned().collect();
    remaining.reverse();
    for (range, mark) in expected {
        for value in range.clone() {
            let entry = remaining.pop().expect("set ran out of elements early");
            assert_eq!(entry, Marked { value, mark: *mark });
        }
    }
    assert!(remaining.is_empty(), "set has unexpected extra elements");
}

#[rstest]
fn test_three_versions_read_in_parallel() {
    let t1 = PersistentAvlSet::from_items(
        |a: &Marked, b: &Marked| a.value < b.value,
        marked_set(0..200, 1),
    );
    let t2 = t1.insert_items(marked_set(200..400, 2));
    let t3 = t1.insert_items(marked_set(400..600, 3));

    let handles: Vec<_> = [
        (t1.fork(), vec![(0..200, 1)]),
        (t2.fork(), vec![(0..200, 1), (200..400, 2)]),
        (t3.fork(), vec![(0..200, 1), (400..600, 3)]),
    ]
    .into_iter()
    .map(|(set, expected)| {
        thread::spawn(move || {
            for _ in 0..50 {
                assert_exact_contents(&set, &expected);
            }
        })
    })
    .collect();

    // Keep mutating a fourth version while the readers run.
    let t4 = t3.insert_items(marked_set(600..800, 4));

    for handle in handles {
        handle.join().expect("reader thread panicked");
    }

    // Nothing the readers or the writer did corrupted any version.
    assert_exact_contents(&t1, &[(0..200, 1)]);
    assert_exact_contents(&t2, &[(0..200, 1), (200..400, 2)]);
    assert_exact_contents(&t3, &[(0..200, 1), (400..600, 3)]);
    assert_exact_contents(&t4, &[(0..200, 1), (400..600, 3), (600..800, 4)]);
}

#[rstest]
fn test_cross_thread_forking_mutation() {
    let original = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, 0..100);

    let handles: Vec<_> = (0..4)
        .map(|index| {
            let fork = original.fork();
            thread::spawn(move || {
                let extended = fork.insert(1000 + index);
                assert_eq!(extended.len(), 101);
                assert_eq!(fork.len(), 100);
                extended.fetch(&(1000 + index)).copied()
            })
        })
        .collect();

    for (index, handle) in handles.into_iter().enumerate() {
        let fetched = handle.join().expect("thread panicked");
        assert_eq!(fetched, Some(1000 + i32::try_from(index).expect("small index")));
    }

    assert_eq!(original.len(), 100);
}
