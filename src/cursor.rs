//! External cursors over a set's ordered elements.
//!
//! A [`RangeCursor`] walks the elements inside a `[start, stop]` range in
//! either direction and may reverse direction mid-iteration. An
//! [`OffsetCursor`] walks forward only, skipping a prefix and capping the
//! number of yielded elements. Both implement the common [`Cursor`]
//! interface and both hold nothing but node references: because published
//! nodes are immutable, a cursor keeps seeing the version it was created on
//! no matter how many newer versions are forked off concurrently.
//!
//! Cursors start unpositioned; the first [`next`](Cursor::next) (or
//! [`prev`](Cursor::prev)) call seats them on the first in-range element.
//! When iteration leaves the range or runs out of elements the cursor
//! releases itself: further `next`/`prev` calls return `false` and
//! [`item`](Cursor::item) panics.

use crate::compare::{RangeTest, gte, lte};
use crate::node::Node;
use crate::set::PersistentAvlSet;

/// The common interface of [`RangeCursor`] and [`OffsetCursor`].
pub trait Cursor<T> {
    /// Moves to the next larger element. Returns `false`, releasing the
    /// cursor, when there is none inside the range.
    fn next(&mut self) -> bool;

    /// Moves to the next smaller element. Returns `false` when there is none
    /// inside the range, or unconditionally on cursors that cannot move
    /// backwards.
    fn prev(&mut self) -> bool;

    /// The element the cursor is seated on.
    ///
    /// # Panics
    ///
    /// Panics if iteration has not started, has finished, or the cursor has
    /// been released.
    fn item(&self) -> &T;

    /// Drops all cursor state. Subsequent `next`/`prev` calls return
    /// `false`; `item` panics.
    fn release(&mut self);
}

// =============================================================================
// RangeCursor
// =============================================================================

/// A bidirectional cursor over the elements between a `start` and a `stop`
/// bound.
///
/// `start(x) == true` marks `x` out of range on the low side, `stop(x) ==
/// true` on the high side; an absent bound leaves that side open. Built by
/// [`PersistentAvlSet::cursor`].
///
/// Reversing direction mid-iteration reseats the cursor from the root at the
/// nearest neighbor of the current element on the other side: after a run of
/// `next` calls, the first `prev` yields the greatest element strictly less
/// than the current one, and symmetrically for `next` after `prev`.
pub struct RangeCursor<'a, T> {
    tree: Option<&'a PersistentAvlSet<T>>,
    /// Ancestors of the current node, root first; the top is the cursor
    /// position.
    stack: Vec<&'a Node<T>>,
    current: Option<&'a Node<T>>,
    start: Option<RangeTest<T>>,
    stop: Option<RangeTest<T>>,
    ascending: bool,
}

impl<'a, T: Clone + 'static> RangeCursor<'a, T> {
    pub(crate) fn new(
        tree: &'a PersistentAvlSet<T>,
        start: Option<RangeTest<T>>,
        stop: Option<RangeTest<T>>,
    ) -> Self {
        Self {
            tree: Some(tree),
            stack: Vec::new(),
            current: tree.root_node(),
            start,
            stop,
            ascending: true,
        }
    }

    fn below_range(&self, item: &T) -> bool {
        self.start.as_ref().is_some_and(|test| test(item))
    }

    fn above_range(&self, item: &T) -> bool {
        self.stop.as_ref().is_some_and(|test| test(item))
    }

    /// Descends to the smallest in-range element of the subtree at `node`,
    /// pushing the path. A node below the range is skipped together with its
    /// left subtree.
    fn descend_min(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(current) = node {
            if self.below_range(&current.item) {
                node = current.right.as_deref();
            } else {
                self.stack.push(current);
                node = current.left.as_deref();
            }
        }
    }

    /// Mirror of [`descend_min`](Self::descend_min): descends to the largest
    /// in-range element, skipping nodes above the range.
    fn descend_max(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(current) = node {
            if self.above_range(&current.item) {
                node = current.left.as_deref();
            } else {
                self.stack.push(current);
                node = current.right.as_deref();
            }
        }
    }

    /// Seats an unpositioned cursor on the first element for its direction.
    ///
    /// Also serves as the reseat step of a direction change, with `current`
    /// as the descent origin. The seed node must still pass the opposite
    /// bound, otherwise the range is empty.
    fn init(&mut self, ascending: bool) -> bool {
        let Some(seed) = self.current else {
            self.release();
            return false;
        };
        if ascending {
            self.descend_min(Some(seed));
        } else {
            self.descend_max(Some(seed));
        }
        self.ascending = ascending;
        self.current = self.stack.last().copied();

        let in_range = self.current.is_some_and(|node| {
            if ascending {
                !self.above_range(&node.item)
            } else {
                !self.below_range(&node.item)
            }
        });
        if !in_range {
            self.release();
            return false;
        }
        true
    }

    /// One-shot reseat when the iteration direction flips.
    ///
    /// Re-descends from the root with a temporary bound derived from the
    /// current element (`lte` as `start` when turning ascending, `gte` as
    /// `stop` when turning descending), so the cursor lands on the nearest
    /// neighbor on the other side. The original bound is restored
    /// afterwards. The reseated position is the result of the `next`/`prev`
    /// call that triggered the turn.
    fn change_direction(&mut self, ascending: bool) -> bool {
        let Some(node) = self.current else {
            self.release();
            return false;
        };
        let pivot = node.item.clone();
        let Some(tree) = self.tree else {
            self.release();
            return false;
        };

        self.stack.clear();
        self.current = tree.root_node();
        if ascending {
            let saved = self.start.take();
            self.start = Some(lte(tree.compare_against(pivot)));
            if !self.next() {
                return false;
            }
            self.start = saved;
        } else {
            let saved = self.stop.take();
            self.stop = Some(gte(tree.compare_against(pivot)));
            if !self.prev() {
                return false;
            }
            self.stop = saved;
        }
        true
    }

    fn pop(&mut self) {
        self.stack.pop();
        self.current = self.stack.last().copied();
    }

    fn swap_head(&mut self) {
        if let (Some(head), Some(current)) = (self.stack.last_mut(), self.current) {
            *head = current;
        }
    }

    pub(crate) fn current_item(&self) -> Option<&'a T> {
        self.current.map(|node| &node.item)
    }
}

impl<T: Clone + 'static> Cursor<T> for RangeCursor<'_, T> {
    fn next(&mut self) -> bool {
        if self.stack.is_empty() {
            return self.init(true);
        }
        if !self.ascending {
            return self.change_direction(true);
        }
        let Some(current) = self.current else {
            self.release();
            return false;
        };

        match current.right.as_deref() {
            // In-order successor rule: climb to the ancestor whose left
            // subtree we came from.
            None => self.pop(),
            Some(right) => {
                self.current = Some(right);
                self.swap_head();
                if right.left.is_some() {
                    self.descend_min(right.left.as_deref());
                    self.current = self.stack.last().copied();
                }
            }
        }

        let in_range = self
            .current
            .is_some_and(|node| !self.above_range(&node.item));
        if !in_range {
            self.release();
            return false;
        }
        true
    }

    fn prev(&mut self) -> bool {
        if self.stack.is_empty() {
            return self.init(false);
        }
        if self.ascending {
            return self.change_direction(false);
        }
        let Some(current) = self.current else {
            self.release();
            return false;
        };

        match current.left.as_deref() {
            None => self.pop(),
            Some(left) => {
                self.current = Some(left);
                self.swap_head();
                if left.right.is_some() {
                    self.descend_max(left.right.as_deref());
                    self.current = self.stack.last().copied();
                }
            }
        }

        let in_range = self
            .current
            .is_some_and(|node| !self.below_range(&node.item));
        if !in_range {
            self.release();
            return false;
        }
        true
    }

    fn item(&self) -> &T {
        match self.current {
            Some(node) if !self.stack.is_empty() => &node.item,
            _ => panic!("no iteration in progress"),
        }
    }

    fn release(&mut self) {
        self.stack.clear();
        self.current = None;
        self.start = None;
        self.stop = None;
        self.tree = None;
    }
}

// =============================================================================
// OffsetCursor
// =============================================================================

/// A forward-only cursor that skips the first `offset` elements and yields
/// at most `limit` elements.
///
/// Built by [`PersistentAvlSet::offset_and_limit`]. [`prev`](Cursor::prev)
/// is inert: it always returns `false` and does not move the cursor.
pub struct OffsetCursor<'a, T> {
    tree: Option<&'a PersistentAvlSet<T>>,
    stack: Vec<&'a Node<T>>,
    offset: usize,
    limit: Option<usize>,
}

impl<'a, T> OffsetCursor<'a, T> {
    pub(crate) fn new(tree: &'a PersistentAvlSet<T>, offset: usize, limit: Option<usize>) -> Self {
        Self {
            tree: Some(tree),
            stack: Vec::new(),
            offset,
            limit,
        }
    }

    fn descend_min(&mut self, mut node: Option<&'a Node<T>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }

    fn advance(&mut self) {
        self.offset = self.offset.saturating_sub(1);
        if let Some(node) = self.stack.pop() {
            self.descend_min(node.right.as_deref());
        }
    }
}

impl<T> Cursor<T> for OffsetCursor<'_, T> {
    fn next(&mut self) -> bool {
        if self.stack.is_empty() {
            let Some(tree) = self.tree else {
                return false;
            };
            self.descend_min(tree.root_node());
            while self.offset > 0 && !self.stack.is_empty() {
                self.advance();
            }
        } else {
            self.advance();
        }

        if self.limit == Some(0) || self.stack.is_empty() {
            self.release();
            return false;
        }
        if let Some(remaining) = self.limit.as_mut() {
            *remaining -= 1;
        }
        true
    }

    fn prev(&mut self) -> bool {
        false
    }

    fn item(&self) -> &T {
        match self.stack.last() {
            Some(node) => &node.item,
            None => panic!("no iteration in progress"),
        }
    }

    fn release(&mut self) {
        self.stack.clear();
        self.tree = None;
    }
}

// =============================================================================
// PersistentAvlSetIterator
// =============================================================================

/// A lazy in-order [`Iterator`] over a set's elements, built by
/// [`PersistentAvlSet::iter`].
pub struct PersistentAvlSetIterator<'a, T> {
    cursor: RangeCursor<'a, T>,
}

impl<'a, T: Clone + 'static> PersistentAvlSetIterator<'a, T> {
    pub(crate) const fn new(cursor: RangeCursor<'a, T>) -> Self {
        Self { cursor }
    }
}

impl<'a, T: Clone + 'static> Iterator for PersistentAvlSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.next() {
            self.cursor.current_item()
        } else {
            None
        }
    }
}

impl<T: Clone + 'static> std::iter::FusedIterator for PersistentAvlSetIterator<'_, T> {}

// =============================================================================
// Tests
// =============================================================================
