//! This crate exposes ordered key-value maps built on Binary Search
//! Trees (BSTs) with three interchangeable self-balancing strategies.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert and find stored records. BSTs are typically defined recursively
//! using the notion of a `Node`. A `Node` stores a key and value and
//! sometimes has child `Node`s. The most important invariants of a BST
//! are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have
//!    a key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree
//!    have a key greater than its own key.
//!
//! Searching the tree takes `O(height)`, so everything depends on keeping
//! the height close to `lg N`. A plain BST fed sorted keys degenerates
//! into a linked list; the three tree types here each prevent that in a
//! different way, on top of one shared core:
//!
//! * [`avl::AvlTree`] stores a height in every node and repairs any
//!   two-level height difference with rotations on insert.
//! * [`redblack::RbTree`] colors every node red or black and maintains
//!   the classic coloring rules with recoloring and rotations on insert.
//! * [`splay::SplayTree`] keeps no metadata and instead rotates every
//!   accessed node to the root, balancing amortized over accesses.
//!
//! All three support sorted iteration and two other traversal orders;
//! see [`traverse`] for the iterator designs. None of them support
//! deletion — entries leave a tree only when the whole tree is dropped.
//!
//! ```
//! use bstmap::avl::AvlTree;
//! use bstmap::Traversal;
//!
//! let mut tree = AvlTree::new();
//! for (key, value) in [(2, "two"), (1, "one"), (3, "three")] {
//!     tree.insert(key, value);
//! }
//!
//! assert_eq!(tree.find(&2), Some(&"two"));
//! let keys: Vec<i32> = tree.traverse(Traversal::InOrder).map(|(k, _)| *k).collect();
//! assert_eq!(keys, [1, 2, 3]);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod avl;
pub mod redblack;
pub mod splay;
pub mod traverse;

mod bst;
mod util;

#[cfg(test)]
mod test;

pub use avl::AvlTree;
pub use redblack::RbTree;
pub use splay::SplayTree;
pub use traverse::Traversal;

use traverse::Snapshot;

/// The operations shared by every tree map in this crate, so code (and
/// tests, and benchmarks) can swap balancing strategies freely.
///
/// `find` takes `&mut self` because a splay tree restructures itself on
/// every successful lookup; the other trees also offer an inherent
/// `find(&self, ..)`.
pub trait OrderedMap<K: Ord, V> {
    /// The number of distinct keys stored.
    fn len(&self) -> usize;

    /// Whether the map holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts the given value at the given key, overwriting the value in
    /// place if the key is already present.
    fn insert(&mut self, key: K, value: V);

    /// A reference to the value stored for `key`, or `None` if the key is
    /// absent.
    fn find(&mut self, key: &K) -> Option<&V>;

    /// An iterator over the entries in the requested order, materialized
    /// at the time of the call.
    fn traverse(&self, order: Traversal) -> Snapshot<'_, K, V>;
}
