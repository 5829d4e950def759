//! Nodes of the skip list and the arena that owns them.
//!
//! Nodes never point at each other directly. Each node lives in a slot of an
//! [`Arena`] and is addressed by a [`NodeId`] which stays valid until the node
//! is released, so the links between nodes are plain indices and the map owns
//! every node through a single vector.

use std::{fmt, ops};

// ////////////////////////////////////////////////////////////////////////////
// NodeId
// ////////////////////////////////////////////////////////////////////////////

/// Stable address of a node within an [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ////////////////////////////////////////////////////////////////////////////
// SkipNode
// ////////////////////////////////////////////////////////////////////////////

/// A key/value pair together with its forward links.
///
/// The node has one link per level it participates in, so the length of
/// `links` is the node's height. It is fixed at creation: only the targets of
/// the links are ever rewritten.
#[derive(Debug)]
pub(crate) struct SkipNode<K, V> {
    pub key: K,
    pub value: V,
    // links[i] is the next node at level i, or None at the end of that level.
    pub links: Box<[Option<NodeId>]>,
}

impl<K, V> SkipNode<K, V> {
    /// Create an unlinked node spanning `height` levels.
    pub fn new(key: K, value: V, height: usize) -> Self {
        debug_assert!(height >= 1, "nodes occupy at least level 0");
        SkipNode {
            key,
            value,
            links: vec![None; height].into_boxed_slice(),
        }
    }

    /// The number of levels this node participates in.
    #[inline]
    pub fn height(&self) -> usize {
        self.links.len()
    }

    /// Consumes the node returning the pair it contains.
    #[inline]
    pub fn into_inner(self) -> (K, V) {
        (self.key, self.value)
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Arena
// ////////////////////////////////////////////////////////////////////////////

/// Slab of nodes with stable indices.
///
/// Released slots are remembered and handed out again by later allocations,
/// so the arena never grows beyond the largest number of nodes alive at once.
pub(crate) struct Arena<K, V> {
    slots: Vec<Option<SkipNode<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Moves `node` into the arena and returns its address.
    pub fn alloc(&mut self, node: SkipNode<K, V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    /// Moves the node at `id` out of the arena, vacating its slot.
    pub fn release(&mut self, id: NodeId) -> SkipNode<K, V> {
        match self.slots[id.0].take() {
            Some(node) => {
                self.free.push(id);
                node
            }
            None => unreachable!("node {id:?} released twice"),
        }
    }

    /// Drops every node.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Number of nodes currently alive.
    #[cfg(test)]
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Hands the slots over to an owning iterator.
    pub fn into_slots(self) -> Vec<Option<SkipNode<K, V>>> {
        self.slots
    }
}

impl<K, V> ops::Index<NodeId> for Arena<K, V> {
    type Output = SkipNode<K, V>;

    #[inline]
    fn index(&self, id: NodeId) -> &SkipNode<K, V> {
        match &self.slots[id.0] {
            Some(node) => node,
            None => unreachable!("dangling node {id:?}"),
        }
    }
}

impl<K, V> ops::IndexMut<NodeId> for Arena<K, V> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut SkipNode<K, V> {
        match &mut self.slots[id.0] {
            Some(node) => node,
            None => unreachable!("dangling node {id:?}"),
        }
    }
}

/// Takes the node at `id` out of a slot vector handed over by
/// [`Arena::into_slots`].
pub(crate) fn take_slot<K, V>(
    slots: &mut [Option<SkipNode<K, V>>],
    id: NodeId,
) -> SkipNode<K, V> {
    match slots[id.0].take() {
        Some(node) => node,
        None => unreachable!("dangling node {id:?}"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Arena, SkipNode, take_slot};

    #[test]
    fn new_node() {
        let node = SkipNode::new("k", 1, 3);
        assert_eq!(node.height(), 3);
        assert!(node.links.iter().all(Option::is_none));
        assert_eq!(node.into_inner(), ("k", 1));
    }

    #[test]
    fn alloc_release_reuses_slots() {
        let mut arena = Arena::new();
        let a = arena.alloc(SkipNode::new(1, "a", 1));
        let b = arena.alloc(SkipNode::new(2, "b", 2));
        assert_eq!(arena.live(), 2);
        assert_eq!(arena[a].key, 1);
        assert_eq!(arena[b].height(), 2);

        assert_eq!(arena.release(a).into_inner(), (1, "a"));
        assert_eq!(arena.live(), 1);

        let c = arena.alloc(SkipNode::new(3, "c", 1));
        assert_eq!(c, a);
        assert_eq!(arena[c].value, "c");
        assert_eq!(arena.live(), 2);

        arena[b].value = "B";
        let mut slots = arena.into_slots();
        assert_eq!(take_slot(&mut slots, b).into_inner(), (2, "B"));
        assert!(slots[1].is_none());
    }

    #[test]
    #[should_panic(expected = "released twice")]
    fn double_release() {
        let mut arena = Arena::new();
        let a = arena.alloc(SkipNode::new(1, (), 1));
        let _ = arena.release(a);
        let _ = arena.release(a);
    }

    #[test]
    fn clear() {
        let mut arena = Arena::new();
        for i in 0..10 {
            let _ = arena.alloc(SkipNode::new(i, i, 1));
        }
        arena.clear();
        assert_eq!(arena.live(), 0);
    }
}
