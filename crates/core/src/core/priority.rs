//! Priority queue for BPE merge candidates.
//!
//! Candidates are ordered by merge rank first and by the original position of
//! their left segment second, so that among equal-rank merges the leftmost one
//! fires first. The queue has no decrease-key or arbitrary removal; entries
//! whose segments were replaced are dropped by the caller when popped.

use crate::core::chain::NodeId;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

/// Ordering key of a merge candidate.
///
/// Compared lexicographically: `(rank, position)`. This is the exact form of
/// the classic `rank + position / prompt_length` key, without floating point
/// and without positions ever spilling into the rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MergePriority {
    /// Merge rank (lower fires earlier)
    pub rank: u32,
    /// Original position of the left segment
    pub position: usize,
}

/// A merge waiting in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    /// Ordering key
    pub priority: MergePriority,
    /// Left segment of the merge; the right one is its `next` at pop time
    pub left: NodeId,
    /// Token ID produced by the merge
    pub merged: u32,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(rank: u32, position: usize, left: NodeId, merged: u32) -> Self {
        Self {
            priority: MergePriority { rank, position },
            left,
            merged,
        }
    }
}

// Reversed so the max-heap pops the lowest key first
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.left.cmp(&self.left))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority queue of merge candidates.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
#[derive(Debug, Default)]
pub struct CandidateQueue {
    heap: OctonaryHeap<MergeCandidate>,
}

impl CandidateQueue {
    /// Create a new queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
        }
    }

    /// Create a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a merge candidate onto the queue.
    #[inline]
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.heap.push(candidate);
    }

    /// Pop the candidate with the lowest key.
    #[inline]
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        self.heap.pop()
    }

    /// Peek at the candidate with the lowest key without removing it.
    pub fn peek(&self) -> Option<&MergeCandidate> {
        self.heap.peek()
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
