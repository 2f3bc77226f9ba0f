//! An AVL tree: the height-balanced strategy.
//!
//! Every node stores the height of its subtree. After each insert the
//! tree walks from the new node back toward the root, refreshing heights;
//! the first ancestor whose children's heights differ by two is repaired
//! with one single or double rotation, which restores balance for the
//! whole tree. Lookup and insert are `O(log n)` in the worst case.
//!
//! # Examples
//!
//! ```
//! use bstmap::avl::AvlTree;
//!
//! let mut tree = AvlTree::new();
//!
//! // Nothing in here yet.
//! assert_eq!(tree.find(&1), None);
//!
//! tree.insert(1, 2);
//! assert_eq!(tree.find(&1), Some(&2));
//!
//! // Inserting a new value for the same key overwrites the value.
//! tree.insert(1, 3);
//! assert_eq!(tree.find(&1), Some(&3));
//! assert_eq!(tree.len(), 1);
//! ```

use std::fmt;
use std::ptr::NonNull;

use crate::bst::{Bst, Link, Node};
use crate::traverse::{InOrderIter, PreOrderIter, Snapshot, Traversal};
use crate::util::Emplaced;
use crate::OrderedMap;

/// The height tag stored in every AVL node.
///
/// A node with no children has height 1; an absent child counts as
/// height 0.
#[derive(Clone, Copy, Debug)]
pub struct Height(pub(crate) usize);

impl Default for Height {
    fn default() -> Self {
        Height(1)
    }
}

/// A map from keys to values backed by a height-balanced binary search
/// tree.
pub struct AvlTree<K, V> {
    bst: Bst<K, V, Height>,
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> AvlTree<K, V> {
    /// Generates a new, empty tree.
    pub fn new() -> Self {
        AvlTree { bst: Bst::new() }
    }

    /// The number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.bst.len
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.bst.len == 0
    }

    /// Potentially finds the value associated with the given key. If no
    /// node has the corresponding key, `None` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1, 2);
    ///
    /// assert_eq!(tree.find(&1), Some(&2));
    /// assert_eq!(tree.find(&42), None);
    /// ```
    pub fn find(&self, key: &K) -> Option<&V>
    where
        K: Ord,
    {
        // SAFETY: the node is owned by this tree, and `&self` keeps the
        // tree alive and unmodified while the borrow is out.
        self.bst
            .find_node(key)
            .map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Inserts the given value into the tree stored at the given key.
    /// Inserting a new value for an existing key overwrites its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstmap::avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    ///
    /// tree.insert(1, 2);
    /// assert_eq!(tree.find(&1), Some(&2));
    ///
    /// tree.insert(1, 3);
    /// assert_eq!(tree.find(&1), Some(&3));
    /// ```
    pub fn insert(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        if let Emplaced::Created(node) = self.bst.emplace(key, value) {
            // SAFETY: `emplace` just linked `node` into this tree.
            unsafe { self.rebalance(node) };
        }

        if cfg!(debug_assertions) {
            if let Some(root) = self.bst.root.0 {
                // SAFETY: the root is live and we hold `&mut self`.
                unsafe {
                    let n = &*root.as_ptr();
                    let left = Self::height(n.left);
                    let right = Self::height(n.right);
                    assert_eq!(n.balance.0, left.max(right) + 1);
                    assert!(left.abs_diff(right) <= 1);
                }
            }
        }
    }

    /// Lazily visits entries in ascending key order, deriving each
    /// successor from the live links.
    pub fn iter(&self) -> InOrderIter<'_, K, V, Height> {
        // SAFETY: the returned iterator borrows `self`, which keeps every
        // node live and the structure frozen until it is dropped.
        unsafe { InOrderIter::new(self.bst.root) }
    }

    /// Lazily visits each entry before anything in its subtrees.
    pub fn iter_pre_order(&self) -> PreOrderIter<'_, K, V, Height> {
        // SAFETY: as in `iter`.
        unsafe { PreOrderIter::new(self.bst.root) }
    }

    /// Walks the tree once up front and returns an iterator over the
    /// materialized sequence in the requested order.
    pub fn traverse(&self, order: Traversal) -> Snapshot<'_, K, V> {
        // SAFETY: as in `iter`.
        unsafe { Snapshot::new(self.bst.root, order) }
    }

    /// Height of a possibly-absent subtree.
    ///
    /// # Safety
    ///
    /// `link` must be an edge of a live tree.
    unsafe fn height(link: Link<K, V, Height>) -> usize {
        match link.0 {
            Some(node) => (*node.as_ptr()).balance.0,
            None => 0,
        }
    }

    /// Recomputes `node`'s stored height from its children.
    ///
    /// # Safety
    ///
    /// `node` must be live and exclusively reachable.
    unsafe fn fix_height(node: NonNull<Node<K, V, Height>>) {
        let n = &mut *node.as_ptr();
        n.balance = Height(Self::height(n.left).max(Self::height(n.right)) + 1);
    }

    /// The balance factor `height(left) - height(right)`.
    ///
    /// # Safety
    ///
    /// `node` must be live.
    unsafe fn delta(node: NonNull<Node<K, V, Height>>) -> isize {
        let n = &*node.as_ptr();
        Self::height(n.left) as isize - Self::height(n.right) as isize
    }

    /// Walks from the freshly linked node toward the root, recomputing
    /// each ancestor's height and repairing the first ancestor whose
    /// subtrees now differ in height by two. A single repair restores
    /// balance everywhere (the subtree returns to its pre-insert height);
    /// the rest of the walk only refreshes stored heights.
    ///
    /// # Safety
    ///
    /// `node` must be a live node of this tree.
    unsafe fn rebalance(&mut self, node: NonNull<Node<K, V, Height>>) {
        let mut child = node;
        loop {
            let Some(ancestor) = (*child.as_ptr()).parent.0 else {
                return;
            };
            Self::fix_height(ancestor);
            child = match Self::delta(ancestor) {
                2 => self.fix_left_heavy(ancestor),
                -2 => self.fix_right_heavy(ancestor),
                _ => ancestor,
            };
        }
    }

    /// `ancestor`'s left subtree is two levels taller. Repairs it and
    /// returns the node now occupying `ancestor`'s former position.
    ///
    /// # Safety
    ///
    /// `ancestor` must be a live node of this tree with balance factor 2.
    unsafe fn fix_left_heavy(
        &mut self,
        ancestor: NonNull<Node<K, V, Height>>,
    ) -> NonNull<Node<K, V, Height>> {
        let child = (*ancestor.as_ptr())
            .left
            .0
            .expect("a left-heavy node has a left child");
        let c = &*child.as_ptr();
        if Self::height(c.left) >= Self::height(c.right) {
            // Taller grandchild on the same side: a single rotation.
            self.bst.rotate_right(child);
            Self::fix_height(ancestor);
            Self::fix_height(child);
            child
        } else {
            // Taller grandchild on the opposite side: rotate it out of
            // the bend first, then over the ancestor.
            let grandchild = c.right.0.expect("the taller grandchild exists");
            self.bst.rotate_left(grandchild);
            self.bst.rotate_right(grandchild);
            Self::fix_height(ancestor);
            Self::fix_height(child);
            Self::fix_height(grandchild);
            grandchild
        }
    }

    /// Mirror image of [`AvlTree::fix_left_heavy`].
    ///
    /// # Safety
    ///
    /// `ancestor` must be a live node of this tree with balance factor -2.
    unsafe fn fix_right_heavy(
        &mut self,
        ancestor: NonNull<Node<K, V, Height>>,
    ) -> NonNull<Node<K, V, Height>> {
        let child = (*ancestor.as_ptr())
            .right
            .0
            .expect("a right-heavy node has a right child");
        let c = &*child.as_ptr();
        if Self::height(c.right) >= Self::height(c.left) {
            self.bst.rotate_left(child);
            Self::fix_height(ancestor);
            Self::fix_height(child);
            child
        } else {
            let grandchild = c.left.0.expect("the taller grandchild exists");
            self.bst.rotate_right(grandchild);
            self.bst.rotate_left(grandchild);
            Self::fix_height(ancestor);
            Self::fix_height(child);
            Self::fix_height(grandchild);
            grandchild
        }
    }
}

impl<K, V> fmt::Debug for AvlTree<K, V>
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

impl<K: Ord, V> OrderedMap<K, V> for AvlTree<K, V> {
    fn len(&self) -> usize {
        AvlTree::len(self)
    }

    fn insert(&mut self, key: K, value: V) {
        AvlTree::insert(self, key, value);
    }

    fn find(&mut self, key: &K) -> Option<&V> {
        AvlTree::find(self, key)
    }

    fn traverse(&self, order: Traversal) -> Snapshot<'_, K, V> {
        AvlTree::traverse(self, order)
    }
}

#[cfg(test)]
impl<K: Ord, V> AvlTree<K, V> {
    /// Panics unless the wiring is sound, every stored height matches its
    /// subtree, and no node's children differ in height by more than one.
    pub(crate) fn assert_invariants(&self) {
        self.bst.assert_wired();

        unsafe fn walk<K, V>(link: Link<K, V, Height>) -> usize {
            let Some(node) = link.0 else {
                return 0;
            };
            let n = &*node.as_ptr();
            let left = walk(n.left);
            let right = walk(n.right);
            assert_eq!(n.balance.0, left.max(right) + 1, "stored height is stale");
            assert!(
                left.abs_diff(right) <= 1,
                "subtree heights differ by more than one"
            );
            left.max(right) + 1
        }

        unsafe {
            walk(self.bst.root);
        }
    }
}
