//! The binary-search-tree core shared by every balancing strategy.
//!
//! [`Bst`] owns the nodes, performs the order-preserving descent for
//! inserts and lookups, and provides the two rotation primitives that the
//! strategies in [`crate::avl`], [`crate::redblack`], and [`crate::splay`]
//! are built from. It never reads or writes a node's balance tag; each
//! tree type wraps a `Bst` and runs its own rebalancing pass after the
//! structural part of an insert.

use std::cmp::Ordering;
use std::ptr::NonNull;

use crate::util::Emplaced;

/// A possibly-empty edge to a node.
///
/// This is a bare `Copy` pointer wrapper: child edges and the root edge
/// own the node they point at by convention (every node is allocated with
/// `Box` and freed exactly once in `Bst::drop`), while parent edges are
/// always non-owning back-references. No `Link` ever frees anything on
/// its own.
pub(crate) struct Link<K, V, B>(pub(crate) Option<NonNull<Node<K, V, B>>>);

impl<K, V, B> Clone for Link<K, V, B> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}
impl<K, V, B> Copy for Link<K, V, B> {}

/// One key/value pair and the links that place it in a tree.
///
/// `balance` is the strategy's per-node metadata: a height for AVL, a
/// color for red-black, `()` for splay.
pub(crate) struct Node<K, V, B> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link<K, V, B>,
    pub(crate) right: Link<K, V, B>,
    /// Non-owning; `None` only for the root.
    pub(crate) parent: Link<K, V, B>,
    pub(crate) balance: B,
}

impl<K, V, B> Node<K, V, B> {
    fn new_boxed(key: K, value: V) -> Box<Self>
    where
        B: Default,
    {
        Box::new(Node {
            key,
            value,
            left: Link(None),
            right: Link(None),
            parent: Link(None),
            balance: B::default(),
        })
    }

    /// Whether `node` is the left child of its parent.
    ///
    /// # Safety
    ///
    /// `node` must point at a live node that has a parent.
    pub(crate) unsafe fn is_left(node: NonNull<Self>) -> bool {
        let parent = (*node.as_ptr())
            .parent
            .0
            .expect("only the root has no parent");
        (*parent.as_ptr()).left.0 == Some(node)
    }

    /// The sibling of `node`'s parent, which may be absent.
    ///
    /// # Safety
    ///
    /// `node` must point at a live node with a parent and a grandparent.
    pub(crate) unsafe fn uncle(node: NonNull<Self>) -> Link<K, V, B> {
        let parent = (*node.as_ptr())
            .parent
            .0
            .expect("an uncle requires a parent");
        let grandparent = (*parent.as_ptr())
            .parent
            .0
            .expect("an uncle requires a grandparent");
        if Self::is_left(parent) {
            (*grandparent.as_ptr()).right
        } else {
            (*grandparent.as_ptr()).left
        }
    }
}

/// A plain binary search tree: a root edge and a count of distinct keys.
///
/// `Bst` only ever restructures the tree through [`Bst::emplace`] and the
/// two rotation primitives, so every strategy layered on top shares one
/// set of pointer-surgery code paths.
pub(crate) struct Bst<K, V, B> {
    pub(crate) root: Link<K, V, B>,
    pub(crate) len: usize,
}

impl<K, V, B> Bst<K, V, B> {
    pub(crate) fn new() -> Self {
        Bst {
            root: Link(None),
            len: 0,
        }
    }

    /// Binary-search insert. Descends from the root comparing keys until
    /// it finds the key or an empty child slot. A new node is linked into
    /// the empty slot and reported as [`Emplaced::Created`]; an existing
    /// node has its value overwritten in place and is reported as
    /// [`Emplaced::Updated`]. Only `Created` grows `len`, and only
    /// `Created` leaves the caller owing a rebalancing pass.
    pub(crate) fn emplace(&mut self, key: K, value: V) -> Emplaced<NonNull<Node<K, V, B>>>
    where
        K: Ord,
        B: Default,
    {
        let Some(mut cur) = self.root.0 else {
            let root = NonNull::from(Box::leak(Node::new_boxed(key, value)));
            self.root = Link(Some(root));
            self.len = 1;
            return Emplaced::Created(root);
        };
        loop {
            // SAFETY: `cur` came from the root edge or a child edge, all
            // of which point at live nodes owned by this tree, and we hold
            // `&mut self` so no other borrow of any node exists.
            let node = unsafe { &mut *cur.as_ptr() };
            match key.cmp(&node.key) {
                Ordering::Equal => {
                    node.value = value;
                    return Emplaced::Updated(cur);
                }
                Ordering::Less => match node.left.0 {
                    Some(left) => cur = left,
                    None => {
                        let mut child = Node::new_boxed(key, value);
                        child.parent = Link(Some(cur));
                        let child = NonNull::from(Box::leak(child));
                        node.left = Link(Some(child));
                        self.len += 1;
                        return Emplaced::Created(child);
                    }
                },
                Ordering::Greater => match node.right.0 {
                    Some(right) => cur = right,
                    None => {
                        let mut child = Node::new_boxed(key, value);
                        child.parent = Link(Some(cur));
                        let child = NonNull::from(Box::leak(child));
                        node.right = Link(Some(child));
                        self.len += 1;
                        return Emplaced::Created(child);
                    }
                },
            }
        }
    }

    /// The same descent as [`Bst::emplace`], read-only.
    pub(crate) fn find_node(&self, key: &K) -> Option<NonNull<Node<K, V, B>>>
    where
        K: Ord,
    {
        let mut cur = self.root.0;
        while let Some(node) = cur {
            // SAFETY: child edges point at live nodes owned by this tree,
            // and `&self` keeps them alive and unmodified for the borrow.
            let node_ref = unsafe { &*node.as_ptr() };
            match key.cmp(&node_ref.key) {
                Ordering::Equal => return Some(node),
                Ordering::Less => cur = node_ref.left.0,
                Ordering::Greater => cur = node_ref.right.0,
            }
        }
        None
    }

    /// Promote `node` above its parent, demoting the parent to be `node`'s
    /// left child. `node`'s old left subtree crosses over to become the
    /// parent's right subtree, since every key in it sits between the two
    /// keys. If the parent was the root, `node` becomes the root.
    ///
    /// Balance tags are untouched; callers fix up heights or colors
    /// themselves afterwards.
    ///
    /// # Diagram
    ///
    /// ```text
    ///   parent                node
    ///    /  \                 /  \
    ///   a   node   ->     parent  c
    ///       /  \           /  \
    ///      b    c         a    b
    /// ```
    ///
    /// # Safety
    ///
    /// `node` must be a live node of this tree and the right child of its
    /// parent.
    pub(crate) unsafe fn rotate_left(&mut self, node: NonNull<Node<K, V, B>>) {
        let n = &mut *node.as_ptr();
        let parent_ptr = n.parent.0.expect("rotating a node requires a parent");
        let parent = &mut *parent_ptr.as_ptr();
        debug_assert!(
            parent.right.0 == Some(node),
            "rotate_left promotes a right child"
        );

        parent.right = n.left;
        if let Some(crossing) = parent.right.0 {
            (*crossing.as_ptr()).parent = Link(Some(parent_ptr));
        }

        let grandparent = parent.parent;
        n.left = Link(Some(parent_ptr));
        n.parent = grandparent;
        parent.parent = Link(Some(node));

        // Re-point whichever edge owned the rotated subtree.
        match grandparent.0 {
            None => self.root = Link(Some(node)),
            Some(g) => {
                let g = &mut *g.as_ptr();
                if g.left.0 == Some(parent_ptr) {
                    g.left = Link(Some(node));
                } else {
                    g.right = Link(Some(node));
                }
            }
        }
    }

    /// Mirror image of [`Bst::rotate_left`]: promote `node` above its
    /// parent, demoting the parent to be `node`'s right child.
    ///
    /// # Safety
    ///
    /// `node` must be a live node of this tree and the left child of its
    /// parent.
    pub(crate) unsafe fn rotate_right(&mut self, node: NonNull<Node<K, V, B>>) {
        let n = &mut *node.as_ptr();
        let parent_ptr = n.parent.0.expect("rotating a node requires a parent");
        let parent = &mut *parent_ptr.as_ptr();
        debug_assert!(
            parent.left.0 == Some(node),
            "rotate_right promotes a left child"
        );

        parent.left = n.right;
        if let Some(crossing) = parent.left.0 {
            (*crossing.as_ptr()).parent = Link(Some(parent_ptr));
        }

        let grandparent = parent.parent;
        n.right = Link(Some(parent_ptr));
        n.parent = grandparent;
        parent.parent = Link(Some(node));

        match grandparent.0 {
            None => self.root = Link(Some(node)),
            Some(g) => {
                let g = &mut *g.as_ptr();
                if g.left.0 == Some(parent_ptr) {
                    g.left = Link(Some(node));
                } else {
                    g.right = Link(Some(node));
                }
            }
        }
    }
}

impl<K, V, B> Drop for Bst<K, V, B> {
    /// Tears the tree down with an explicit work-list so that dropping a
    /// deep tree cannot overflow the call stack. `Node` itself has no
    /// `Drop` impl: its links are bare pointers, so freeing a node only
    /// releases its key and value.
    fn drop(&mut self) {
        let mut pending = Vec::new();
        if let Some(root) = self.root.0.take() {
            pending.push(root);
        }
        while let Some(node) = pending.pop() {
            // SAFETY: every node was allocated with `Box::new` in
            // `Node::new_boxed` and is owned by exactly one child edge (or
            // the root edge), so each pointer reaches this loop exactly
            // once.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            if let Some(left) = node.left.0 {
                pending.push(left);
            }
            if let Some(right) = node.right.0 {
                pending.push(right);
            }
        }
    }
}

#[cfg(test)]
impl<K: Ord, V, B> Bst<K, V, B> {
    /// Panics unless the structure is a well-formed search tree: keys
    /// strictly ordered, every child's parent link pointing back at the
    /// node that owns it, and `len` matching the node count.
    pub(crate) fn assert_wired(&self) {
        unsafe fn walk<K: Ord, V, B>(
            node: NonNull<Node<K, V, B>>,
            lo: Option<&K>,
            hi: Option<&K>,
        ) -> usize {
            let n = &*node.as_ptr();
            if let Some(lo) = lo {
                assert!(*lo < n.key, "key escaped its ancestor's lower bound");
            }
            if let Some(hi) = hi {
                assert!(n.key < *hi, "key escaped its ancestor's upper bound");
            }
            let mut count = 1;
            if let Some(left) = n.left.0 {
                assert_eq!((*left.as_ptr()).parent.0, Some(node), "stale parent link");
                count += walk(left, lo, Some(&n.key));
            }
            if let Some(right) = n.right.0 {
                assert_eq!((*right.as_ptr()).parent.0, Some(node), "stale parent link");
                count += walk(right, Some(&n.key), hi);
            }
            count
        }

        match self.root.0 {
            None => assert_eq!(self.len, 0),
            Some(root) => unsafe {
                assert!((*root.as_ptr()).parent.0.is_none(), "root has a parent");
                assert_eq!(walk(root, None, None), self.len);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(link: Link<i32, i32, ()>) -> Option<i32> {
        link.0.map(|node| unsafe { (*node.as_ptr()).key })
    }

    /// Builds the shape
    ///
    /// ```text
    ///       4
    ///     /   \
    ///    2     6
    ///   / \   / \
    ///  1   3 5   7
    /// ```
    fn full_three_levels() -> Bst<i32, i32, ()> {
        let mut bst = Bst::new();
        for key in [4, 2, 6, 1, 3, 5, 7] {
            assert!(matches!(bst.emplace(key, key * 10), Emplaced::Created(_)));
        }
        bst.assert_wired();
        bst
    }

    #[test]
    fn emplace_overwrites_without_growing() {
        let mut bst = Bst::<_, _, ()>::new();
        assert!(matches!(bst.emplace(1, 1), Emplaced::Created(_)));
        assert!(matches!(bst.emplace(1, 1000), Emplaced::Updated(_)));
        assert_eq!(bst.len, 1);

        let found = bst.find_node(&1).unwrap();
        assert_eq!(unsafe { (*found.as_ptr()).value }, 1000);
    }

    #[test]
    fn find_node_misses_without_touching_structure() {
        let bst = full_three_levels();
        assert!(bst.find_node(&0).is_none());
        assert!(bst.find_node(&8).is_none());
        bst.assert_wired();
    }

    #[test]
    fn rotate_left_promotes_a_right_child() {
        let mut bst = full_three_levels();

        // Promote 6 over the root.
        let six = bst.find_node(&6).unwrap();
        unsafe { bst.rotate_left(six) };
        bst.assert_wired();

        assert_eq!(key_of(bst.root), Some(6));
        let six = unsafe { &*six.as_ptr() };
        assert_eq!(key_of(six.left), Some(4));
        assert_eq!(key_of(six.right), Some(7));

        // The crossing subtree (5) ended up as 4's right child.
        let four = bst.find_node(&4).unwrap();
        assert_eq!(key_of(unsafe { (*four.as_ptr()).right }), Some(5));
    }

    #[test]
    fn rotate_right_promotes_a_left_child() {
        let mut bst = full_three_levels();

        let two = bst.find_node(&2).unwrap();
        unsafe { bst.rotate_right(two) };
        bst.assert_wired();

        assert_eq!(key_of(bst.root), Some(2));
        let two = unsafe { &*two.as_ptr() };
        assert_eq!(key_of(two.left), Some(1));
        assert_eq!(key_of(two.right), Some(4));

        let four = bst.find_node(&4).unwrap();
        assert_eq!(key_of(unsafe { (*four.as_ptr()).left }), Some(3));
    }

    #[test]
    fn rotations_below_the_root_repoint_the_grandparent() {
        let mut bst = full_three_levels();

        // 3 is 2's right child; promoting it must also swing 4's left edge.
        let three = bst.find_node(&3).unwrap();
        unsafe { bst.rotate_left(three) };
        bst.assert_wired();

        assert_eq!(key_of(bst.root), Some(4));
        let four = bst.find_node(&4).unwrap();
        assert_eq!(key_of(unsafe { (*four.as_ptr()).left }), Some(3));
        let three = unsafe { &*three.as_ptr() };
        assert_eq!(key_of(three.left), Some(2));

        // And the mirror restores the original shape.
        let two = bst.find_node(&2).unwrap();
        unsafe { bst.rotate_right(two) };
        bst.assert_wired();
        assert_eq!(key_of(unsafe { (*bst.find_node(&4).unwrap().as_ptr()).left }), Some(2));
    }

    #[test]
    fn is_left_and_uncle_navigate_by_identity() {
        let bst = full_three_levels();
        let one = bst.find_node(&1).unwrap();
        let three = bst.find_node(&3).unwrap();
        let six = bst.find_node(&6).unwrap();

        unsafe {
            assert!(Node::is_left(one));
            assert!(!Node::is_left(three));
            assert_eq!(Node::uncle(one).0, Some(six));
            assert_eq!(Node::uncle(three).0, Some(six));
        }
    }

    #[test]
    fn drop_releases_a_deep_tree() {
        // A degenerate, height-n spine: teardown must not recurse once per
        // level. Linked by hand so building it isn't quadratic.
        let mut bst = Bst::<i32, i32, ()>::new();
        let mut prev: Option<NonNull<Node<i32, i32, ()>>> = None;
        for key in 0..200_000 {
            let mut node = Node::new_boxed(key, key);
            node.parent = Link(prev);
            let node = NonNull::from(Box::leak(node));
            match prev {
                None => bst.root = Link(Some(node)),
                Some(p) => unsafe { (*p.as_ptr()).right = Link(Some(node)) },
            }
            bst.len += 1;
            prev = Some(node);
        }
        drop(bst);
    }
}
