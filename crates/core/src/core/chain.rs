//! Segment chain: the working state of a single encode.
//!
//! A doubly linked list of segments stored in an arena and addressed by index.
//! Nodes are never removed from the arena; a replaced node is tombstoned and a
//! new node takes its place in the links. Queued candidates keep pointing at
//! the old index and see the tombstone when they are popped.

use std::ops::Index;

/// Index of a segment node in the chain arena.
pub type NodeId = usize;

/// One segment of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentNode {
    /// Token the segment currently represents
    pub token_id: u32,
    /// Index among the initial tokens of the leftmost character it covers
    pub orig_pos: usize,
    /// Tombstone
    pub deleted: bool,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

/// Arena-backed doubly linked chain of segments.
#[derive(Debug, Default)]
pub struct SegmentChain {
    nodes: Vec<SegmentNode>,
    head: Option<NodeId>,
}

impl SegmentChain {
    /// Build a chain with one node per token; node `i` has `orig_pos == i`.
    pub fn from_tokens(tokens: &[u32]) -> Self {
        // Every merge appends a result node and at most one replacement copy.
        let mut nodes = Vec::with_capacity(tokens.len() * 3);
        let last = tokens.len().saturating_sub(1);

        for (i, &token_id) in tokens.iter().enumerate() {
            nodes.push(SegmentNode {
                token_id,
                orig_pos: i,
                deleted: false,
                prev: i.checked_sub(1),
                next: (i < last).then_some(i + 1),
            });
        }

        Self {
            head: (!nodes.is_empty()).then_some(0),
            nodes,
        }
    }

    /// Current first node.
    #[inline]
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Total nodes ever allocated, tombstones included.
    #[inline]
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// The live right neighbour of `id`, or `None` if `id` itself is
    /// tombstoned, sits at the end of the chain, or its neighbour is tombstoned.
    #[inline]
    pub fn live_next(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        if node.deleted {
            return None;
        }
        node.next.filter(|&next| !self.nodes[next].deleted)
    }

    /// Mark a node as logically removed.
    #[inline]
    pub fn tombstone(&mut self, id: NodeId) {
        self.nodes[id].deleted = true;
    }

    /// Tombstone `id` and put a fresh copy of it in its place.
    ///
    /// The copy keeps the token, position and both links; its left neighbour
    /// (or the head) is relinked to it. The right neighbour still points back
    /// at the old node and must be relinked by the caller.
    pub fn replace_with_copy(&mut self, id: NodeId) -> NodeId {
        let mut copy = self.nodes[id];
        self.nodes[id].deleted = true;
        copy.deleted = false;

        let new_id = self.push(copy);
        self.link_after(copy.prev, new_id);
        new_id
    }

    /// Append a node to the arena without linking it.
    #[inline]
    pub fn push(&mut self, node: SegmentNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Point `prev.next` at `id`, or make `id` the head when there is no `prev`.
    #[inline]
    pub fn link_after(&mut self, prev: Option<NodeId>, id: NodeId) {
        match prev {
            Some(prev) => self.nodes[prev].next = Some(id),
            None => self.head = Some(id),
        }
    }

    /// Point `next.prev` at `id`.
    #[inline]
    pub fn link_before(&mut self, next: NodeId, id: NodeId) {
        self.nodes[next].prev = Some(id);
    }

    /// Iterate over the live chain from the head.
    pub fn iter(&self) -> impl Iterator<Item = &SegmentNode> + '_ {
        std::iter::successors(self.head.map(|id| &self.nodes[id]), |node| {
            node.next.map(|id| &self.nodes[id])
        })
    }

    /// Token IDs of the live chain in order.
    pub fn token_ids(&self) -> Vec<u32> {
        self.iter().map(|node| node.token_id).collect()
    }
}

impl Index<NodeId> for SegmentChain {
    type Output = SegmentNode;

    #[inline]
    fn index(&self, id: NodeId) -> &SegmentNode {
        &self.nodes[id]
    }
}
