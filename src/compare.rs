//! Comparison vocabulary for range queries.
//!
//! A [`CompareAgainst`] is a three-way comparator that compares elements of a
//! set against one fixed reference element; [`PersistentAvlSet::compare_against`]
//! builds one from the set's own ordering. A [`RangeTest`] is a boolean
//! predicate used as the `start` or `stop` bound of a range cursor; the
//! factories in this module derive one from a three-way comparator.
//!
//! Bound inclusivity follows from the factory: [`lt`] makes an inclusive and
//! [`lte`] an exclusive lower bound, while [`gt`] makes an inclusive and
//! [`gte`] an exclusive upper bound.
//!
//! # Examples
//!
//! ```rust
//! use arbors::{PersistentAvlSet, lt, gt};
//!
//! let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, 0..10);
//!
//! let mut collected = Vec::new();
//! set.range(
//!     Some(lt(set.compare_against(3))),
//!     Some(gt(set.compare_against(6))),
//!     |item| {
//!         collected.push(*item);
//!         true
//!     },
//! );
//! assert_eq!(collected, vec![3, 4, 5, 6]);
//! ```
//!
//! [`PersistentAvlSet::compare_against`]: crate::PersistentAvlSet::compare_against

use std::cmp::Ordering;

/// A three-way comparison of set elements against a fixed reference.
///
/// Returns [`Ordering::Less`] when the examined element is less than the
/// reference, [`Ordering::Greater`] when it is greater, and
/// [`Ordering::Equal`] when the two are equivalent.
///
/// Any comparator handed to [`get`](crate::PersistentAvlSet::get) or wrapped
/// into a range bound must agree with the ordering the set was built with;
/// otherwise lookups and ranges may walk off the wrong side of the tree.
pub type CompareAgainst<T> = Box<dyn Fn(&T) -> Ordering>;

/// A range bound: `true` means the examined element is out of range.
pub type RangeTest<T> = Box<dyn Fn(&T) -> bool>;

/// Makes a [`RangeTest`] that holds for elements less than the reference.
///
/// As a `start` bound this yields an inclusive lower bound.
pub fn lt<T: 'static>(compare: CompareAgainst<T>) -> RangeTest<T> {
    Box::new(move |item| compare(item) == Ordering::Less)
}

/// Makes a [`RangeTest`] that holds for elements less than or equivalent to
/// the reference.
///
/// As a `start` bound this yields an exclusive lower bound.
pub fn lte<T: 'static>(compare: CompareAgainst<T>) -> RangeTest<T> {
    Box::new(move |item| compare(item) != Ordering::Greater)
}

/// Makes a [`RangeTest`] that holds for elements equivalent to the reference.
pub fn eq<T: 'static>(compare: CompareAgainst<T>) -> RangeTest<T> {
    Box::new(move |item| compare(item) == Ordering::Equal)
}

/// Makes a [`RangeTest`] that holds for elements not equivalent to the
/// reference.
pub fn ne<T: 'static>(compare: CompareAgainst<T>) -> RangeTest<T> {
    Box::new(move |item| compare(item) != Ordering::Equal)
}

/// Makes a [`RangeTest`] that holds for elements greater than or equivalent
/// to the reference.
///
/// As a `stop` bound this yields an exclusive upper bound.
pub fn gte<T: 'static>(compare: CompareAgainst<T>) -> RangeTest<T> {
    Box::new(move |item| compare(item) != Ordering::Less)
}

/// Makes a [`RangeTest`] that holds for elements greater than the reference.
///
/// As a `stop` bound this yields an inclusive upper bound.
pub fn gt<T: 'static>(compare: CompareAgainst<T>) -> RangeTest<T> {
    Box::new(move |item| compare(item) == Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn against_five() -> CompareAgainst<i32> {
        Box::new(|item: &i32| item.cmp(&5))
    }

    #[rstest]
    #[case(4, true)]
    #[case(5, false)]
    #[case(6, false)]
    fn test_lt(#[case] item: i32, #[case] expected: bool) {
        assert_eq!(lt(against_five())(&item), expected);
    }

    #[rstest]
    #[case(4, true)]
    #[case(5, true)]
    #[case(6, false)]
    fn test_lte(#[case] item: i32, #[case] expected: bool) {
        assert_eq!(lte(against_five())(&item), expected);
    }

    #[rstest]
    #[case(4, false)]
    #[case(5, true)]
    #[case(6, false)]
    fn test_eq(#[case] item: i32, #[case] expected: bool) {
        assert_eq!(eq(against_five())(&item), expected);
    }

    #[rstest]
    #[case(4, true)]
    #[case(5, false)]
    #[case(6, true)]
    fn test_ne(#[case] item: i32, #[case] expected: bool) {
        assert_eq!(ne(against_five())(&item), expected);
    }

    #[rstest]
    #[case(4, false)]
    #[case(5, true)]
    #[case(6, true)]
    fn test_gte(#[case] item: i32, #[case] expected: bool) {
        assert_eq!(gte(against_five())(&item), expected);
    }

    #[rstest]
    #[case(4, false)]
    #[case(5, false)]
    #[case(6, true)]
    fn test_gt(#[case] item: i32, #[case] expected: bool) {
        assert_eq!(gt(against_five())(&item), expected);
    }
}
