//! Persistent (immutable) ordered set based on a height-balanced AVL tree.
//!
//! This module provides [`PersistentAvlSet`], an immutable ordered set that
//! uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! A `PersistentAvlSet` keeps its elements sorted by a strict weak ordering
//! closure supplied at construction time.
//!
//! - O(log N) insert, delete, lookup, min/max
//! - O(1) len, `is_empty`, and fork
//! - O(log N + k) range traversal where k is the number of visited elements
//!
//! All mutating operations return new sets without modifying the original;
//! any number of readers may keep traversing older versions. Batched
//! mutations (`from_items`, `insert_items`, `create_with`, `insert_with`,
//! `delete_items`, `delete_with`) share their copy-on-write path work, so
//! correlated keys cost amortized O(1) extra allocations per operation.
//!
//! # Examples
//!
//! ```rust
//! use arbors::PersistentAvlSet;
//!
//! let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [2, 0, 1]);
//! let bigger = set.insert(3);
//!
//! assert_eq!(set.len(), 3);      // Original unchanged
//! assert_eq!(bigger.len(), 4);   // New version
//!
//! let items: Vec<i32> = bigger.iter().copied().collect();
//! assert_eq!(items, vec![0, 1, 2, 3]);
//! ```

use std::cmp::Ordering;

use crate::LessThan;
use crate::compare::{CompareAgainst, RangeTest};
use crate::cursor::{Cursor, OffsetCursor, PersistentAvlSetIterator, RangeCursor};
use crate::node::{self, Link, Node, ReferenceCounter};

/// Shared ownership of the ordering closure a set was built with.
///
/// Forks, reversed copies, and re-sorted clones all hang on to (a wrapper
/// of) the same erased closure, so the ordering travels with every version
/// the way the nodes do. Erased behind `Rc`, or `Arc` (with `Send + Sync`
/// demanded of the closure) under the `arc` feature.
#[cfg(feature = "arc")]
pub(crate) type SharedLess<T> = std::sync::Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

#[cfg(not(feature = "arc"))]
pub(crate) type SharedLess<T> = std::rc::Rc<dyn Fn(&T, &T) -> bool>;

/// A persistent (immutable) ordered set backed by an AVL tree.
///
/// Elements are ordered by the strict weak ordering the set was built with;
/// two elements are equivalent when neither is less than the other, and
/// equivalent elements never coexist (inserting one overwrites the other).
///
/// Mutating operations fork the set and return the fork; unchanged subtrees
/// are shared between versions. Published nodes are never written, so a
/// version can be read (and, under the `arc` feature, read from other
/// threads) regardless of what happens to sets derived from it.
///
/// # Time Complexity
///
/// | Operation          | Complexity        |
/// |--------------------|-------------------|
/// | `new` / `fork`     | O(1)              |
/// | `insert`           | O(log N)          |
/// | `delete`           | O(log N)          |
/// | `fetch` / `get`    | O(log N)          |
/// | `min` / `max`      | O(log N)          |
/// | `len`              | O(1)              |
/// | `reverse`          | O(N)              |
/// | `sorted_clone`     | O(N log N)        |
///
/// # Examples
///
/// ```rust
/// use arbors::PersistentAvlSet;
///
/// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [3, 1, 2]);
/// assert_eq!(set.fetch(&2), Some(&2));
/// assert_eq!(set.min(), Some(&1));
/// assert_eq!(set.max(), Some(&3));
/// ```
pub struct PersistentAvlSet<T> {
    /// Root of the tree; `None` when the set is empty.
    root: Link<T>,
    /// Number of elements reachable from `root`.
    count: usize,
    /// The ordering every version derived from this set shares.
    less: SharedLess<T>,
}

impl<T> Clone for PersistentAvlSet<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            count: self.count,
            less: self.less.clone(),
        }
    }
}

impl<T> PersistentAvlSet<T> {
    /// Returns the number of elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Looks up an element with a three-way comparator.
    ///
    /// Returns the element for which `compare` answers [`Ordering::Equal`].
    /// The comparator must agree with the set's own ordering; a comparator
    /// that sorts differently may walk off the wrong side of the tree and
    /// miss elements that are present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [1, 2, 3]);
    /// assert_eq!(set.get(|item| item.cmp(&2)), Some(&2));
    /// assert_eq!(set.get(|item| item.cmp(&9)), None);
    /// ```
    #[must_use]
    pub fn get(&self, compare: impl Fn(&T) -> Ordering) -> Option<&T> {
        let mut link = &self.root;
        while let Some(node) = link {
            match compare(&node.item) {
                Ordering::Greater => link = &node.left,
                Ordering::Less => link = &node.right,
                Ordering::Equal => return Some(&node.item),
            }
        }
        None
    }

    /// Returns `true` if the set contains an element the comparator
    /// considers equal.
    #[must_use]
    pub fn has(&self, compare: impl Fn(&T) -> Ordering) -> bool {
        self.get(compare).is_some()
    }

    /// Looks up the stored element equivalent to `item` under the set's own
    /// ordering.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [1, 2, 3]);
    /// assert_eq!(set.fetch(&3), Some(&3));
    /// assert_eq!(set.fetch(&7), None);
    /// ```
    #[must_use]
    pub fn fetch(&self, item: &T) -> Option<&T> {
        node::find(&self.root, item, self.less.as_ref())
    }

    /// Returns the smallest element, or `None` for an empty set.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.item)
    }

    /// Returns the largest element, or `None` for an empty set.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.item)
    }

    pub(crate) fn root_node(&self) -> Option<&Node<T>> {
        self.root.as_deref()
    }
}

impl<T: Clone + 'static> PersistentAvlSet<T> {
    /// Creates a new empty set ordered by `less`.
    ///
    /// `less` must be a strict weak ordering: irreflexive, asymmetric,
    /// transitive, with a transitive equivalence class.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set: arbors::PersistentAvlSet<i32> = PersistentAvlSet::new(|a: &i32, b: &i32| a < b);
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub fn new(less: impl LessThan<T>) -> Self {
        let less: SharedLess<T> = ReferenceCounter::new(less);
        Self {
            root: None,
            count: 0,
            less,
        }
    }

    /// Creates a set ordered by `less` and fills it from `items` in a single
    /// batch.
    ///
    /// Since the batch starts from an empty root, every allocated node is
    /// owned by the batch and insertion never pays a copy-on-write cost.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [1, 0, 3, 2, 4]);
    /// assert_eq!(set.len(), 5);
    /// ```
    #[must_use]
    pub fn from_items(less: impl LessThan<T>, items: impl IntoIterator<Item = T>) -> Self {
        let mut set = Self::new(less);
        for item in items {
            set.insert_one(item);
        }
        set
    }

    /// Creates a set ordered by `less` and fills it through a callback.
    ///
    /// `fill` is invoked exactly once with an insert thunk; every insert the
    /// thunk performs belongs to the same batch.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set = PersistentAvlSet::create_with(|a: &i32, b: &i32| a < b, |insert| {
    ///     for i in 0..10 {
    ///         insert(i);
    ///     }
    /// });
    /// assert_eq!(set.len(), 10);
    /// ```
    #[must_use]
    pub fn create_with(less: impl LessThan<T>, fill: impl FnOnce(&mut dyn FnMut(T))) -> Self {
        let mut set = Self::new(less);
        fill(&mut |item| set.insert_one(item));
        set
    }

    /// Returns a shallow copy sharing the whole tree, the count, and the
    /// ordering with `self`.
    ///
    /// Forking is O(1) and is what every mutating operation does first;
    /// `fork` is also available as [`Clone`].
    #[must_use]
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Returns a new set that additionally contains `item`.
    ///
    /// If an equivalent element is already present it is overwritten (the
    /// later insertion wins) and the length does not change.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [1, 2]);
    /// let bigger = set.insert(3);
    ///
    /// assert_eq!(set.len(), 2);      // Original unchanged
    /// assert_eq!(bigger.len(), 3);
    /// ```
    #[must_use]
    pub fn insert(&self, item: T) -> Self {
        let mut fork = self.clone();
        fork.insert_one(item);
        fork
    }

    /// Returns a new set that additionally contains every element of
    /// `items`, inserted under one shared batch.
    #[must_use]
    pub fn insert_items(&self, items: impl IntoIterator<Item = T>) -> Self {
        let mut fork = self.clone();
        for item in items {
            fork.insert_one(item);
        }
        fork
    }

    /// Returns a new set extended through a callback, like
    /// [`create_with`](Self::create_with) but starting from `self`.
    #[must_use]
    pub fn insert_with(&self, fill: impl FnOnce(&mut dyn FnMut(T))) -> Self {
        let mut fork = self.clone();
        fill(&mut |item| fork.insert_one(item));
        fork
    }

    /// Returns a new set lacking the element equivalent to `item`, along
    /// with the removed element.
    ///
    /// Deleting an absent element is not an error: the returned set shares
    /// the entire tree with `self` and the removed element is `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [1, 2, 3]);
    /// let (smaller, removed) = set.delete(&2);
    ///
    /// assert_eq!(removed, Some(2));
    /// assert_eq!(smaller.len(), 2);
    /// assert_eq!(set.len(), 3);      // Original unchanged
    ///
    /// let (same, missing) = smaller.delete(&2);
    /// assert_eq!(missing, None);
    /// assert_eq!(same.len(), 2);
    /// ```
    #[must_use]
    pub fn delete(&self, item: &T) -> (Self, Option<T>) {
        let mut fork = self.clone();
        let removed = fork.delete_one(item);
        (fork, removed)
    }

    /// Returns a new set lacking every element of `items`, along with how
    /// many of them were actually present.
    #[must_use]
    pub fn delete_items(&self, items: &[T]) -> (Self, usize) {
        let mut fork = self.clone();
        let mut deleted = 0;
        for item in items {
            if fork.delete_one(item).is_some() {
                deleted += 1;
            }
        }
        (fork, deleted)
    }

    /// Returns a new set shrunk through a callback.
    ///
    /// `erase` is invoked exactly once with a delete thunk that returns the
    /// removed element, if any; every deletion the thunk performs belongs to
    /// the same batch.
    #[must_use]
    pub fn delete_with(&self, erase: impl FnOnce(&mut dyn FnMut(&T) -> Option<T>)) -> Self {
        let mut fork = self.clone();
        erase(&mut |item| fork.delete_one(item));
        fork
    }

    /// Builds a three-way comparator that compares set elements against
    /// `reference` using the set's own ordering.
    ///
    /// This is the canonical way to produce the argument of
    /// [`get`](Self::get), [`has`](Self::has), and the range-bound factories
    /// in [`compare`](crate::compare).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [1, 2, 3]);
    /// assert!(set.has(set.compare_against(2)));
    /// assert!(!set.has(set.compare_against(9)));
    /// ```
    #[must_use]
    pub fn compare_against(&self, reference: T) -> CompareAgainst<T> {
        let less = self.less.clone();
        Box::new(move |tree_value: &T| {
            if (less.as_ref())(tree_value, &reference) {
                Ordering::Less
            } else if (less.as_ref())(&reference, tree_value) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
    }

    /// Returns a reversed copy of the set.
    ///
    /// Every node is deep-copied with its children swapped and the ordering
    /// is negated, so the copy shares nothing with `self` and is itself a
    /// valid balanced tree.
    ///
    /// # Complexity
    ///
    /// O(N) time and space.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [1, 2, 3]);
    /// let reversed = set.reverse();
    /// let items: Vec<i32> = reversed.iter().copied().collect();
    /// assert_eq!(items, vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn reverse(&self) -> Self {
        let less = self.less.clone();
        let negated: SharedLess<T> = ReferenceCounter::new(move |a: &T, b: &T| {
            (less.as_ref())(b, a)
        });
        Self {
            root: node::mirror(&self.root),
            count: self.count,
            less: negated,
        }
    }

    /// Returns a new empty set ordered by `primary`, with ties broken by the
    /// current ordering.
    ///
    /// Together with [`sorted_clone`](Self::sorted_clone) this supports
    /// maintaining elements in arbitrarily layered sort orders.
    #[must_use]
    pub fn sort_by(&self, primary: impl LessThan<T>) -> Self {
        let fallback = self.less.clone();
        let layered: SharedLess<T> = ReferenceCounter::new(move |a: &T, b: &T| {
            if primary(a, b) {
                true
            } else if primary(b, a) {
                false
            } else {
                (fallback.as_ref())(a, b)
            }
        });
        Self {
            root: None,
            count: 0,
            less: layered,
        }
    }

    /// Re-sorts the set under `primary` (ties broken by the current
    /// ordering) by re-ingesting every element into a fresh tree.
    ///
    /// # Complexity
    ///
    /// O(N log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [3, 1, 2]);
    /// let descending = set.sorted_clone(|a: &i32, b: &i32| b < a);
    /// let items: Vec<i32> = descending.iter().copied().collect();
    /// assert_eq!(items, vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn sorted_clone(&self, primary: impl LessThan<T>) -> Self {
        let mut resorted = self.sort_by(primary);
        for item in self.iter() {
            resorted.insert_one(item.clone());
        }
        resorted
    }

    /// Creates a bidirectional cursor over the elements between `start` and
    /// `stop`.
    ///
    /// `start(x) == true` means `x` is out of range on the low side and
    /// `stop(x) == true` means `x` is out of range on the high side; either
    /// bound may be `None` for an unbounded end. Use the factories in
    /// [`compare`](crate::compare): [`lt`](crate::lt) / [`lte`](crate::lte)
    /// as `start` bounds and [`gt`](crate::gt) / [`gte`](crate::gte) as
    /// `stop` bounds.
    ///
    /// The cursor starts unpositioned: call [`Cursor::next`] to seat it on
    /// the smallest in-range element, or [`Cursor::prev`] for the largest.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{Cursor, PersistentAvlSet, gt, lt};
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, 0..10);
    /// let mut cursor = set.cursor(
    ///     Some(lt(set.compare_against(3))),
    ///     Some(gt(set.compare_against(6))),
    /// );
    ///
    /// let mut items = Vec::new();
    /// while cursor.next() {
    ///     items.push(*cursor.item());
    /// }
    /// assert_eq!(items, vec![3, 4, 5, 6]);
    /// ```
    #[must_use]
    pub fn cursor(
        &self,
        start: Option<RangeTest<T>>,
        stop: Option<RangeTest<T>>,
    ) -> RangeCursor<'_, T> {
        RangeCursor::new(self, start, stop)
    }

    /// Creates a forward-only cursor that skips the first `offset` elements
    /// and yields at most `limit` elements (`None` for no limit).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{Cursor, PersistentAvlSet};
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, 0..10);
    /// let mut cursor = set.offset_and_limit(2, Some(3));
    ///
    /// let mut items = Vec::new();
    /// while cursor.next() {
    ///     items.push(*cursor.item());
    /// }
    /// assert_eq!(items, vec![2, 3, 4]);
    /// ```
    #[must_use]
    pub fn offset_and_limit(&self, offset: usize, limit: Option<usize>) -> OffsetCursor<'_, T> {
        OffsetCursor::new(self, offset, limit)
    }

    /// Returns a lazy iterator over the elements in ascending order.
    #[must_use]
    pub fn iter(&self) -> PersistentAvlSetIterator<'_, T> {
        PersistentAvlSetIterator::new(self.cursor(None, None))
    }

    /// Visits every element in ascending order until `visit` returns
    /// `false`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::PersistentAvlSet;
    ///
    /// let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [2, 0, 1]);
    /// let mut items = Vec::new();
    /// set.walk(|item| {
    ///     items.push(*item);
    ///     true
    /// });
    /// assert_eq!(items, vec![0, 1, 2]);
    /// ```
    pub fn walk(&self, visit: impl FnMut(&T) -> bool) {
        self.range(None, None, visit);
    }

    /// Visits the elements between `start` and `stop` in ascending order
    /// until `visit` returns `false`.
    ///
    /// Bound inclusivity follows the factory used: `lt` start is inclusive,
    /// `lte` exclusive; `gt` stop is inclusive, `gte` exclusive.
    pub fn range(
        &self,
        start: Option<RangeTest<T>>,
        stop: Option<RangeTest<T>>,
        mut visit: impl FnMut(&T) -> bool,
    ) {
        let mut cursor = self.cursor(start, stop);
        while cursor.next() {
            if !visit(cursor.item()) {
                cursor.release();
            }
        }
    }

    /// Visits every element from `start` upward in ascending order until
    /// `visit` returns `false`.
    pub fn after(&self, start: RangeTest<T>, visit: impl FnMut(&T) -> bool) {
        self.range(Some(start), None, visit);
    }

    /// Visits every element up to `stop` in ascending order until `visit`
    /// returns `false`.
    pub fn before(&self, stop: RangeTest<T>, visit: impl FnMut(&T) -> bool) {
        self.range(None, Some(stop), visit);
    }

    /// Inserts one element under the currently running batch.
    fn insert_one(&mut self, item: T) {
        let inserted = node::insert_at(&mut self.root, item, self.less.as_ref());
        if inserted.added {
            self.count += 1;
        }
    }

    /// Deletes one element under the currently running batch.
    ///
    /// Probes with a read-only descent first so that a miss leaves the tree
    /// untouched and fully shared.
    fn delete_one(&mut self, target: &T) -> Option<T> {
        node::find(&self.root, target, self.less.as_ref())?;
        let removed = node::remove_at(&mut self.root, target, self.less.as_ref())?;
        self.count -= 1;
        Some(removed.item)
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for PersistentAvlSet<T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Clone + PartialEq + 'static> PartialEq for PersistentAvlSet<T> {
    /// Two sets are equal when they contain equal elements in the same
    /// order, regardless of tree shape or ordering closure identity.
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Clone + Eq + 'static> Eq for PersistentAvlSet<T> {}

impl<'a, T: Clone + 'static> IntoIterator for &'a PersistentAvlSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentAvlSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================
