//! A splay tree: the move-to-root-on-access strategy.
//!
//! Splay trees keep no per-node balance metadata at all. Instead, every
//! insert and every successful lookup rotates the accessed node all the
//! way to the root (zig, zig-zig, and zig-zag cases), so recently used
//! keys sit near the top and operations cost `O(log n)` amortized.
//! Because a lookup restructures the tree, [`SplayTree::find`] takes
//! `&mut self`; a missed lookup changes nothing.
//!
//! # Examples
//!
//! ```
//! use bstmap::splay::SplayTree;
//!
//! let mut tree = SplayTree::new();
//!
//! tree.insert(1, 2);
//! assert_eq!(tree.find(&1), Some(&2));
//! assert_eq!(tree.find(&42), None);
//!
//! tree.insert(1, 3);
//! assert_eq!(tree.find(&1), Some(&3));
//! assert_eq!(tree.len(), 1);
//! ```

use std::fmt;
use std::ptr::NonNull;

use crate::bst::{Bst, Node};
use crate::traverse::{InOrderIter, PreOrderIter, Snapshot, Traversal};
use crate::util::Emplaced;
use crate::OrderedMap;

/// A map from keys to values backed by a splay tree.
pub struct SplayTree<K, V> {
    bst: Bst<K, V, ()>,
}

impl<K, V> Default for SplayTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SplayTree<K, V> {
    /// Generates a new, empty tree.
    pub fn new() -> Self {
        SplayTree { bst: Bst::new() }
    }

    /// The number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.bst.len
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.bst.len == 0
    }

    /// Potentially finds the value associated with the given key, moving
    /// its node to the root. If no node has the corresponding key, `None`
    /// is returned and the tree is untouched.
    pub fn find(&mut self, key: &K) -> Option<&V>
    where
        K: Ord,
    {
        let node = self.bst.find_node(key)?;
        // SAFETY: `find_node` returned a live node of this tree, and the
        // returned borrow is tied to `&mut self`.
        unsafe {
            self.splay(node);
            Some(&(*node.as_ptr()).value)
        }
    }

    /// Inserts the given value into the tree stored at the given key and
    /// moves the key's node to the root. Inserting a new value for an
    /// existing key overwrites its value (and still splays).
    pub fn insert(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        let node = match self.bst.emplace(key, value) {
            Emplaced::Created(node) | Emplaced::Updated(node) => node,
        };
        // SAFETY: `emplace` returned a live node of this tree.
        unsafe { self.splay(node) };
    }

    /// Lazily visits entries in ascending key order, deriving each
    /// successor from the live links. Iteration does not splay.
    pub fn iter(&self) -> InOrderIter<'_, K, V, ()> {
        // SAFETY: the returned iterator borrows `self`, which keeps every
        // node live and the structure frozen until it is dropped.
        unsafe { InOrderIter::new(self.bst.root) }
    }

    /// Lazily visits each entry before anything in its subtrees.
    pub fn iter_pre_order(&self) -> PreOrderIter<'_, K, V, ()> {
        // SAFETY: as in `iter`.
        unsafe { PreOrderIter::new(self.bst.root) }
    }

    /// Walks the tree once up front and returns an iterator over the
    /// materialized sequence in the requested order. Traversal does not
    /// splay.
    pub fn traverse(&self, order: Traversal) -> Snapshot<'_, K, V> {
        // SAFETY: as in `iter`.
        unsafe { Snapshot::new(self.bst.root, order) }
    }

    /// Rotates `node` to the root.
    ///
    /// # Safety
    ///
    /// `node` must be a live node of this tree.
    unsafe fn splay(&mut self, node: NonNull<Node<K, V, ()>>) {
        loop {
            let Some(parent) = (*node.as_ptr()).parent.0 else {
                break;
            };
            let node_is_left = Node::is_left(node);

            if (*parent.as_ptr()).parent.0.is_none() {
                // Zig: the parent is the root; one rotation finishes.
                if node_is_left {
                    self.bst.rotate_right(node);
                } else {
                    self.bst.rotate_left(node);
                }
                break;
            }

            let parent_is_left = Node::is_left(parent);
            if node_is_left == parent_is_left {
                // Zig-zig: the parent must rotate over the grandparent
                // before the node rotates; the other order forfeits the
                // amortized bound.
                if node_is_left {
                    self.bst.rotate_right(parent);
                    self.bst.rotate_right(node);
                } else {
                    self.bst.rotate_left(parent);
                    self.bst.rotate_left(node);
                }
            } else if node_is_left {
                // Zig-zag: two rotations of the node itself.
                self.bst.rotate_right(node);
                self.bst.rotate_left(node);
            } else {
                self.bst.rotate_left(node);
                self.bst.rotate_right(node);
            }
        }

        debug_assert!(self.bst.root.0 == Some(node), "splay left the node below the root");
    }
}

impl<K, V> fmt::Debug for SplayTree<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.traverse(Traversal::InOrder))
            .finish()
    }
}

impl<K: Ord, V> OrderedMap<K, V> for SplayTree<K, V> {
    fn len(&self) -> usize {
        SplayTree::len(self)
    }

    fn insert(&mut self, key: K, value: V) {
        SplayTree::insert(self, key, value);
    }

    fn find(&mut self, key: &K) -> Option<&V> {
        SplayTree::find(self, key)
    }

    fn traverse(&self, order: Traversal) -> Snapshot<'_, K, V> {
        SplayTree::traverse(self, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_key(tree: &SplayTree<i32, i32>) -> i32 {
        let root = tree.bst.root.0.expect("tree is not empty");
        unsafe { (*root.as_ptr()).key }
    }

    #[test]
    fn every_insert_moves_the_key_to_the_root() {
        let mut tree = SplayTree::new();
        for key in [5, 1, 7, 8, 2, 3, 0, 4, 6, 9] {
            tree.insert(key, key);
            assert_eq!(root_key(&tree), key);
            tree.bst.assert_wired();
        }
        assert_eq!(tree.len(), 10);
    }

    #[test]
    fn a_found_key_becomes_the_root() {
        let mut tree = SplayTree::new();
        for key in [5, 1, 7, 8, 2, 3, 0, 4, 6, 9] {
            tree.insert(key, key);
        }

        assert_eq!(tree.find(&0), Some(&0));
        assert_eq!(root_key(&tree), 0);
        tree.bst.assert_wired();

        // Splaying a deep key drags it up past every ancestor.
        assert_eq!(tree.find(&9), Some(&9));
        assert_eq!(root_key(&tree), 9);
        tree.bst.assert_wired();
    }

    #[test]
    fn a_missed_lookup_changes_nothing() {
        let mut tree = SplayTree::new();
        for key in [2, 1, 3] {
            tree.insert(key, key);
        }
        let before = root_key(&tree);

        assert_eq!(tree.find(&42), None);
        assert_eq!(root_key(&tree), before);
        tree.bst.assert_wired();
    }

    #[test]
    fn overwriting_splays_the_existing_node() {
        let mut tree = SplayTree::new();
        for key in [1, 2, 3, 4] {
            tree.insert(key, key);
        }

        tree.insert(1, 1000);
        assert_eq!(root_key(&tree), 1);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.find(&1), Some(&1000));
    }

    #[test]
    fn in_order_traversal_is_sorted() {
        let mut tree = SplayTree::new();
        for key in [5, 1, 7, 8, 2, 3, 0, 4, 6, 9] {
            tree.insert(key, key);
        }

        let keys: Vec<i32> = tree.traverse(Traversal::InOrder).map(|(k, _)| *k).collect();
        assert_eq!(keys, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    mod quicktests {
        use super::*;
        use crate::test::quick::{check_against_model, Op};

        quickcheck::quickcheck! {
            fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
                let mut tree = SplayTree::new();
                check_against_model(&ops, &mut tree);
                tree.bst.assert_wired();
                true
            }

            fn accessed_keys_surface(keys: Vec<i8>) -> bool {
                let mut tree = SplayTree::new();
                for key in &keys {
                    tree.insert(*key, *key);
                }
                for key in &keys {
                    assert_eq!(tree.find(key), Some(key));
                    tree.bst.assert_wired();
                }
                true
            }
        }
    }
}
