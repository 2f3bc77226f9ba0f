//! A red-black tree: the color-balanced strategy.
//!
//! Every node is red or black; new nodes start red. The coloring rules —
//! black root, no red node with a red parent, equal black counts on every
//! root-to-leaf path — bound the tree height to twice the shortest
//! branch, so lookup and insert are `O(log n)`. Inserting walks upward
//! from the new node resolving red-red violations by recoloring (pushing
//! the violation toward the root) or by at most two rotations.
//!
//! # Examples
//!
//! ```
//! use bstmap::redblack::RbTree;
//!
//! let mut tree = RbTree::new();
//!
//! tree.insert("a", 1);
//! tree.insert("b", 2);
//! assert_eq!(tree.find(&"a"), Some(&1));
//!
//! tree.insert("a", 3);
//! assert_eq!(tree.find(&"a"), Some(&3));
//! assert_eq!(tree.len(), 2);
//! ```

use std::fmt;
use std::mem;
use std::ptr::NonNull;

use crate::bst::{Bst, Link, Node};
use crate::traverse::{InOrderIter, PreOrderIter, Snapshot, Traversal};
use crate::util::Emplaced;
use crate::OrderedMap;

/// The color tag stored in every red-black node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    /// New nodes start red; inserting a red node never changes any
    /// path's black count.
    Red,
    /// Absent children also count as black.
    Black,
}

impl Default for Color {
    fn default() -> Self {
        Color::Red
    }
}

/// A map from keys to values backed by a red-black tree.
pub struct RbTree<K, V> {
    bst: Bst<K, V, Color>,
}

impl<K, V> Default for RbTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RbTree<K, V> {
    /// Generates a new, empty tree.
    pub fn new() -> Self {
        RbTree { bst: Bst::new() }
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
    /// use bstmap::redblack::RbTree;
    ///
    /// let mut tree = RbTree::new();
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
                unsafe { assert_eq!((*root.as_ptr()).balance, Color::Black) };
            }
        }
    }

    /// Lazily visits entries in ascending key order, deriving each
    /// successor from the live links.
    pub fn iter(&self) -> InOrderIter<'_, K, V, Color> {
        // SAFETY: the returned iterator borrows `self`, which keeps every
        // node live and the structure frozen until it is dropped.
        unsafe { InOrderIter::new(self.bst.root) }
    }

    /// Lazily visits each entry before anything in its subtrees.
    pub fn iter_pre_order(&self) -> PreOrderIter<'_, K, V, Color> {
        // SAFETY: as in `iter`.
        unsafe { PreOrderIter::new(self.bst.root) }
    }

    /// Walks the tree once up front and returns an iterator over the
    /// materialized sequence in the requested order.
    pub fn traverse(&self, order: Traversal) -> Snapshot<'_, K, V> {
        // SAFETY: as in `iter`.
        unsafe { Snapshot::new(self.bst.root, order) }
    }

    /// Color of a possibly-absent node; absent children count as black.
    ///
    /// # Safety
    ///
    /// `link` must be an edge of a live tree.
    unsafe fn color(link: Link<K, V, Color>) -> Color {
        match link.0 {
            Some(node) => (*node.as_ptr()).balance,
            None => Color::Black,
        }
    }

    /// Walks upward from the freshly linked (red) node, resolving red-red
    /// violations, then pins the root black.
    ///
    /// # Safety
    ///
    /// `node` must be a live node of this tree.
    unsafe fn rebalance(&mut self, node: NonNull<Node<K, V, Color>>) {
        let mut node = node;
        loop {
            let Some(parent) = (*node.as_ptr()).parent.0 else {
                // The walk reached the root; blackened below.
                break;
            };
            if (*parent.as_ptr()).balance == Color::Black {
                // A red child under a black parent violates nothing.
                break;
            }

            // The parent is red, so it is not the root and the
            // grandparent exists.
            let grandparent = (*parent.as_ptr())
                .parent
                .0
                .expect("a red node is never the root");

            if Self::color(Node::uncle(node)) == Color::Red {
                // Red uncle: recolor and push the violation two levels up.
                let uncle = Node::uncle(node).0.expect("the uncle is red");
                (*parent.as_ptr()).balance = Color::Black;
                (*uncle.as_ptr()).balance = Color::Black;
                (*grandparent.as_ptr()).balance = Color::Red;
                node = grandparent;
                continue;
            }

            // Black (or absent) uncle: terminal case. Straighten a
            // zig-zag first, swapping which node ends up on top, then
            // rotate the grandparent down and trade colors with it.
            let g = &*grandparent.as_ptr();
            let mut lower = node;
            let mut upper = parent;
            if g.left.0 == Some(parent) && (*parent.as_ptr()).right.0 == Some(node) {
                self.bst.rotate_left(node);
                mem::swap(&mut lower, &mut upper);
            } else if g.right.0 == Some(parent) && (*parent.as_ptr()).left.0 == Some(node) {
                self.bst.rotate_right(node);
                mem::swap(&mut lower, &mut upper);
            }
            if Node::is_left(lower) {
                self.bst.rotate_right(upper);
            } else {
                self.bst.rotate_left(upper);
            }
            (*upper.as_ptr()).balance = Color::Black;
            (*grandparent.as_ptr()).balance = Color::Red;
            break;
        }

        // Idempotent: recoloring may have walked all the way up, and the
        // very first insert creates a red root.
        if let Some(root) = self.bst.root.0 {
            (*root.as_ptr()).balance = Color::Black;
        }
    }
}

impl<K, V> fmt::Debug for RbTree<K, V>
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

impl<K: Ord, V> OrderedMap<K, V> for RbTree<K, V> {
    fn len(&self) -> usize {
        RbTree::len(self)
    }

    fn insert(&mut self, key: K, value: V) {
        RbTree::insert(self, key, value);
    }

    fn find(&mut self, key: &K) -> Option<&V> {
        RbTree::find(self, key)
    }

    fn traverse(&self, order: Traversal) -> Snapshot<'_, K, V> {
        RbTree::traverse(self, order)
    }
}

#[cfg(test)]
impl<K: Ord, V> RbTree<K, V> {
    /// Panics unless the wiring is sound, the root is black, no red node
    /// has a red child, and every path to an absent child crosses the
    /// same number of black nodes.
    pub(crate) fn assert_invariants(&self) {
        self.bst.assert_wired();

        unsafe fn color<K, V>(link: Link<K, V, Color>) -> Color {
            match link.0 {
                Some(node) => (*node.as_ptr()).balance,
                None => Color::Black,
            }
        }

        unsafe fn black_height<K, V>(link: Link<K, V, Color>) -> usize {
            let Some(node) = link.0 else {
                // An absent child is a black leaf.
                return 1;
            };
            let n = &*node.as_ptr();
            if n.balance == Color::Red {
                assert_eq!(color(n.left), Color::Black, "red node with a red child");
                assert_eq!(color(n.right), Color::Black, "red node with a red child");
            }
            let left = black_height(n.left);
            let right = black_height(n.right);
            assert_eq!(left, right, "black-heights diverge");
            left + (n.balance == Color::Black) as usize
        }

        if let Some(root) = self.bst.root.0 {
            unsafe {
                assert_eq!((*root.as_ptr()).balance, Color::Black, "root must be black");
                black_height(self.bst.root);
            }
        }
    }
}
