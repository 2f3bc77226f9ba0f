/// What [`Bst::emplace`](crate::bst::Bst::emplace) did with the requested
/// key.
pub(crate) enum Emplaced<N> {
    /// No node held the key, so one was created and linked into an empty
    /// child slot. The caller owes a rebalancing pass for it.
    Created(N),
    /// A node already held the key; its value was overwritten in place and
    /// the structure is untouched. Carrying the node (rather than nothing)
    /// lets the splay strategy move it to the root anyway.
    Updated(N),
}
