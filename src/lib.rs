//! # arbors
//!
//! A persistent (immutable) ordered set backed by a height-balanced AVL tree.
//!
//! ## Overview
//!
//! [`PersistentAvlSet`] keeps its elements ordered by a user-supplied
//! strict weak ordering closure. Every mutating operation returns a new set
//! and leaves the original untouched; unchanged subtrees are shared between
//! versions, so a mutation allocates O(log N) nodes at most.
//!
//! - O(log N) insert, delete, lookup, min/max
//! - O(1) len, `is_empty`, and fork
//! - Amortized O(1) extra allocations per operation inside a batched
//!   mutation (`from_items`, `insert_items`, `create_with`, ...)
//! - Bidirectional range cursors that can reverse direction mid-iteration
//!
//! ## Example
//!
//! ```rust
//! use arbors::PersistentAvlSet;
//!
//! let set = PersistentAvlSet::from_items(|a: &i32, b: &i32| a < b, [3, 1, 2]);
//! let bigger = set.insert(4);
//!
//! // The original set is unchanged
//! assert_eq!(set.len(), 3);
//! assert_eq!(bigger.len(), 4);
//!
//! let in_order: Vec<i32> = bigger.iter().copied().collect();
//! assert_eq!(in_order, vec![1, 2, 3, 4]);
//! ```
//!
//! ## Ordering
//!
//! The ordering closure must be a strict weak order: irreflexive, asymmetric,
//! and transitive, with a transitive equivalence (`!less(a, b) && !less(b, a)`).
//! Two equivalent elements never coexist in a set; inserting an element
//! equivalent to a stored one overwrites the stored element in place.
//!
//! ## Feature Flags
//!
//! - `arc`: share nodes and comparators through `Arc` instead of `Rc`,
//!   making sets (and forks of them) safe to read from multiple threads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// =============================================================================
// LessThan Alias Trait
// =============================================================================

/// The strict weak ordering a set keeps itself sorted by.
///
/// This is an alias trait: any `Fn(&T, &T) -> bool` closure qualifies
/// (additionally `Send + Sync` under the `arc` feature). The set considers
/// two elements equivalent when neither is less than the other.
#[cfg(feature = "arc")]
pub trait LessThan<T>: Fn(&T, &T) -> bool + Send + Sync + 'static {}

#[cfg(feature = "arc")]
impl<T, F> LessThan<T> for F where F: Fn(&T, &T) -> bool + Send + Sync + 'static {}

/// The strict weak ordering a set keeps itself sorted by.
///
/// This is an alias trait: any `Fn(&T, &T) -> bool` closure qualifies
/// (additionally `Send + Sync` under the `arc` feature). The set considers
/// two elements equivalent when neither is less than the other.
#[cfg(not(feature = "arc"))]
pub trait LessThan<T>: Fn(&T, &T) -> bool + 'static {}

#[cfg(not(feature = "arc"))]
impl<T, F> LessThan<T> for F where F: Fn(&T, &T) -> bool + 'static {}

pub mod compare;
pub mod cursor;
mod node;
pub mod set;

pub use compare::{CompareAgainst, RangeTest, eq, gt, gte, lt, lte, ne};
pub use cursor::{Cursor, OffsetCursor, PersistentAvlSetIterator, RangeCursor};
pub use set::PersistentAvlSet;
