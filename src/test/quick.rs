use std::collections::BTreeMap;
use std::fmt::Debug;

use quickcheck::{Arbitrary, Gen};

use crate::{OrderedMap, Traversal};

/// An enum for the various kinds of "things" to do to a tree in a
/// quicktest.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Op<K, V> {
    /// Insert the K, V into the tree.
    Insert(K, V),
    /// Look the K up.
    Find(K),
    /// Compare an in-order traversal against the model.
    Iter,
}

impl<K, V> Arbitrary for Op<K, V>
where
    K: Arbitrary,
    V: Arbitrary,
{
    /// Tells quickcheck how to randomly choose an operation.
    fn arbitrary(g: &mut Gen) -> Self {
        match *g.choose(&[0, 1, 2]).unwrap() {
            0 => Op::Insert(K::arbitrary(g), V::arbitrary(g)),
            1 => Op::Find(K::arbitrary(g)),
            2 => Op::Iter,
            _ => unreachable!(),
        }
    }
}

/// Applies a set of operations to a tree and a `BTreeMap` model. Every
/// lookup must agree with the model, every `Iter` op must see identical
/// ordered entries, and the final sizes must match.
pub(crate) fn check_against_model<T, K, V>(ops: &[Op<K, V>], tree: &mut T) -> BTreeMap<K, V>
where
    T: OrderedMap<K, V>,
    K: Ord + Clone,
    V: Debug + PartialEq + Clone,
{
    let mut model = BTreeMap::new();
    for op in ops {
        match op {
            Op::Insert(k, v) => {
                tree.insert(k.clone(), v.clone());
                model.insert(k.clone(), v.clone());
            }
            Op::Find(k) => {
                assert_eq!(tree.find(k), model.get(k));
            }
            Op::Iter => {
                assert!(
                    tree.traverse(Traversal::InOrder).eq(model.iter()),
                    "in-order traversal diverged from the model"
                );
            }
        }
    }
    assert_eq!(tree.len(), model.len());
    model
}
