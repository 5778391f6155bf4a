//! Tree nodes and the copy-on-write AVL algorithms.
//!
//! A published node is immutable: mutations descend over `&mut Link<T>` and
//! rewrite nodes through [`ReferenceCounter::make_mut`], which clones a node
//! exactly when some other tree version can still see it (strong count > 1)
//! and rewrites it in place when this batch already owns it. Consecutive
//! writes on overlapping paths inside one batch therefore share their path
//! copies, and a batch that started from an empty root never copies at all.
//!
//! The recursion unwind doubles as the root-ward rebalance walk: each level
//! learns from below whether the subtree changed height, restores the AVL
//! balance with a single or double rotation where needed, and stops
//! propagating as soon as its own stored height is unchanged.

/// Shared handle through which tree versions hold their nodes.
///
/// The strong count doubles as the batch-ownership test: a node counted once
/// is reachable only from the mutation batch that allocated or copied it and
/// may be rewritten in place, while any higher count means an already
/// published version can still see the node and `make_mut` clones it
/// instead. `std::rc::Rc` by default; `std::sync::Arc` under the `arc`
/// feature so whole trees can be read across threads.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

/// An owning link to a subtree; `None` is the empty subtree.
pub(crate) type Link<T> = Option<ReferenceCounter<Node<T>>>;

/// A single tree node: the element, the subtree height, and two child links.
///
/// The height of a leaf is 1, so the AVL bound of ~1.44 log2(N) keeps the
/// `u8` from overflowing for any addressable population. There is no parent
/// pointer; mutation paths live on the call stack and cursor paths on an
/// explicit ancestor stack.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) item: T,
    pub(crate) height: u8,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    pub(crate) const fn leaf(item: T) -> Self {
        Self {
            item,
            height: 1,
            left: None,
            right: None,
        }
    }

    /// Relative balance: positive when right-heavy, negative when left-heavy.
    fn balance(&self) -> i16 {
        i16::from(height(&self.right)) - i16::from(height(&self.left))
    }

    fn recompute_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }
}

/// Height of the subtree behind `link`; 0 for the empty subtree.
pub(crate) fn height<T>(link: &Link<T>) -> u8 {
    link.as_ref().map_or(0, |node| node.height)
}

/// Locates the element equivalent to `target` without copying anything.
pub(crate) fn find<'a, T>(
    mut link: &'a Link<T>,
    target: &T,
    less: &dyn Fn(&T, &T) -> bool,
) -> Option<&'a T> {
    while let Some(node) = link {
        if less(&node.item, target) {
            link = &node.right;
        } else if less(target, &node.item) {
            link = &node.left;
        } else {
            return Some(&node.item);
        }
    }
    None
}

/// Deep copy of a subtree with left and right swapped on every node.
///
/// Shares nothing with the source. Swapping children preserves heights and
/// balance factors, so the mirror is a valid AVL tree for the negated
/// ordering.
pub(crate) fn mirror<T: Clone>(link: &Link<T>) -> Link<T> {
    link.as_ref().map(|node| {
        ReferenceCounter::new(Node {
            item: node.item.clone(),
            height: node.height,
            left: mirror(&node.right),
            right: mirror(&node.left),
        })
    })
}

// =============================================================================
// Rotations
// =============================================================================

/// Rotates the subtree behind `link` to the left:
/// `a(x, b(y, z))` becomes `b(a(x, y), z)`.
///
/// Only `a` and `b` change; `x`, `y`, and `z` keep their nodes. Both changed
/// nodes get their heights recomputed.
fn rotate_left<T: Clone>(link: &mut Link<T>) {
    let mut upper_opt = link.take();
    let Some(upper_rc) = upper_opt.as_mut() else {
        return;
    };
    let upper = ReferenceCounter::make_mut(upper_rc);

    let mut pivot_opt = upper.right.take();
    let Some(pivot_rc) = pivot_opt.as_mut() else {
        *link = upper_opt;
        return;
    };
    let pivot = ReferenceCounter::make_mut(pivot_rc);

    upper.right = pivot.left.take();
    upper.recompute_height();

    pivot.left = upper_opt;
    pivot.recompute_height();

    *link = pivot_opt;
}

/// Rotates the subtree behind `link` to the right:
/// `a(b(x, y), z)` becomes `b(x, a(y, z))`.
fn rotate_right<T: Clone>(link: &mut Link<T>) {
    let mut upper_opt = link.take();
    let Some(upper_rc) = upper_opt.as_mut() else {
        return;
    };
    let upper = ReferenceCounter::make_mut(upper_rc);

    let mut pivot_opt = upper.left.take();
    let Some(pivot_rc) = pivot_opt.as_mut() else {
        *link = upper_opt;
        return;
    };
    let pivot = ReferenceCounter::make_mut(pivot_rc);

    upper.left = pivot.right.take();
    upper.recompute_height();

    pivot.right = upper_opt;
    pivot.recompute_height();

    *link = pivot_opt;
}

/// Restores the AVL invariant at the node behind `link` after one of its
/// subtrees changed height.
///
/// A balance of ±1 or 0 only needs the height refreshed. A balance of ±2 is
/// fixed by a single rotation, preceded by an inner rotation of the heavy
/// child when that child leans the other way (the LR/RL double-rotation
/// cases). Anything outside [-2, 2] means the tree is corrupted.
fn fix<T: Clone>(link: &mut Link<T>) {
    let node = match link.as_mut() {
        None => return,
        Some(rc) => ReferenceCounter::make_mut(rc),
    };

    let balance = node.balance();
    match balance {
        -1..=1 => node.recompute_height(),
        2 => {
            if node.right.as_ref().is_some_and(|right| right.balance() < 0) {
                rotate_right(&mut node.right);
            }
            rotate_left(link);
        }
        -2 => {
            if node.left.as_ref().is_some_and(|left| left.balance() > 0) {
                rotate_left(&mut node.left);
            }
            rotate_right(link);
        }
        _ => panic!("AVL invariant violated: balance factor {balance} outside [-2, 2]"),
    }
}

// =============================================================================
// Insertion
// =============================================================================

/// Result of one insertion level: whether a new element entered the set and
/// whether the subtree grew taller (the rebalance short-circuit signal).
pub(crate) struct Inserted {
    pub(crate) added: bool,
    grew: bool,
}

/// Inserts `item` into the subtree behind `link` under the copy-on-write
/// discipline.
///
/// An equivalent element is overwritten in place: the path is still copied
/// where shared, but the shape, heights, and count are untouched and no
/// rebalancing runs.
pub(crate) fn insert_at<T: Clone>(
    link: &mut Link<T>,
    item: T,
    less: &dyn Fn(&T, &T) -> bool,
) -> Inserted {
    let node = match link.as_mut() {
        None => {
            *link = Some(ReferenceCounter::new(Node::leaf(item)));
            return Inserted {
                added: true,
                grew: true,
            };
        }
        Some(rc) => ReferenceCounter::make_mut(rc),
    };

    let below = if less(&node.item, &item) {
        insert_at(&mut node.right, item, less)
    } else if less(&item, &node.item) {
        insert_at(&mut node.left, item, less)
    } else {
        // Equivalent element already present: the later insertion wins.
        node.item = item;
        return Inserted {
            added: false,
            grew: false,
        };
    };

    if !below.grew {
        return below;
    }
    let old_height = node.height;
    fix(link);
    Inserted {
        added: below.added,
        grew: height(link) != old_height,
    }
}

// =============================================================================
// Deletion
// =============================================================================

/// Result of one deletion level: the removed element and whether the subtree
/// lost height (the rebalance short-circuit signal).
pub(crate) struct Removed<T> {
    pub(crate) item: T,
    shrank: bool,
}

/// Unlinks the smallest element of the subtree behind `link`.
///
/// Used to pull the in-order successor out of a right subtree when deleting
/// an interior node. Returns `None` only for an empty subtree.
fn take_leftmost<T: Clone>(link: &mut Link<T>) -> Option<Removed<T>> {
    let node = match link.as_mut() {
        None => return None,
        Some(rc) => ReferenceCounter::make_mut(rc),
    };

    if node.left.is_some() {
        let below = take_leftmost(&mut node.left)?;
        if !below.shrank {
            return Some(below);
        }
        let old_height = node.height;
        fix(link);
        return Some(Removed {
            item: below.item,
            shrank: height(link) != old_height,
        });
    }

    let child = node.right.take();
    std::mem::replace(link, child).map(|taken| Removed {
        item: ReferenceCounter::unwrap_or_clone(taken).item,
        shrank: true,
    })
}

/// Removes the element equivalent to `target` from the subtree behind `link`.
///
/// A node with two children swaps in the leftmost item of its right subtree;
/// a node with at most one child is replaced by that child. Either way the
/// structural removal happens at the bottom of the tree and the unwind
/// rebalances the path with the same short-circuit as insertion.
pub(crate) fn remove_at<T: Clone>(
    link: &mut Link<T>,
    target: &T,
    less: &dyn Fn(&T, &T) -> bool,
) -> Option<Removed<T>> {
    let node = match link.as_mut() {
        None => return None,
        Some(rc) => ReferenceCounter::make_mut(rc),
    };

    if less(&node.item, target) {
        let below = remove_at(&mut node.right, target, less)?;
        if !below.shrank {
            return Some(below);
        }
        let old_height = node.height;
        fix(link);
        return Some(Removed {
            item: below.item,
            shrank: height(link) != old_height,
        });
    }

    if less(target, &node.item) {
        let below = remove_at(&mut node.left, target, less)?;
        if !below.shrank {
            return Some(below);
        }
        let old_height = node.height;
        fix(link);
        return Some(Removed {
            item: below.item,
            shrank: height(link) != old_height,
        });
    }

    if node.left.is_some() && node.right.is_some() {
        let successor = take_leftmost(&mut node.right)?;
        let item = std::mem::replace(&mut node.item, successor.item);
        if !successor.shrank {
            return Some(Removed {
                item,
                shrank: false,
            });
        }
        let old_height = node.height;
        fix(link);
        return Some(Removed {
            item,
            shrank: height(link) != old_height,
        });
    }

    let child = node.left.take().or_else(|| node.right.take());
    std::mem::replace(link, child).map(|taken| Removed {
        item: ReferenceCounter::unwrap_or_clone(taken).item,
        shrank: true,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod audit {
    //! Structural audits shared by the in-crate test modules.

    use super::{Link, height};

    /// Checks the balance, height, leaf, and ordering invariants of a whole
    /// subtree and returns the number of reachable nodes.
    pub(crate) fn check_subtree<T>(
        link: &Link<T>,
        less: &dyn Fn(&T, &T) -> bool,
        lower: Option<&T>,
        upper: Option<&T>,
    ) -> usize {
        let Some(node) = link.as_ref() else { return 0 };

        assert_eq!(
            node.height,
            1 + height(&node.left).max(height(&node.right)),
            "stored height disagrees with recomputation"
        );
        let balance = i16::from(height(&node.right)) - i16::from(height(&node.left));
        assert!((-1..=1).contains(&balance), "node out of balance");
        if node.height == 1 {
            assert!(
                node.left.is_none() && node.right.is_none(),
                "leaf with children"
            );
        }
        if let Some(low) = lower {
            assert!(less(low, &node.item), "in-order predecessor not less");
        }
        if let Some(high) = upper {
            assert!(less(&node.item, high), "in-order successor not greater");
        }

        1 + check_subtree(&node.left, less, lower, Some(&node.item))
            + check_subtree(&node.right, less, Some(&node.item), upper)
    }

    /// Sums the depth of every node, for average-depth statistics.
    pub(crate) fn depth_sum<T>(link: &Link<T>, depth: usize) -> usize {
        link.as_ref().map_or(0, |node| {
            depth + depth_sum(&node.left, depth + 1) + depth_sum(&node.right, depth + 1)
        })
    }
}
