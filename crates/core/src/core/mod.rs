//! Core BPE algorithm implementation.
//!
//! This module contains the vocabulary and merge tables and the
//! priority-queue merge engine that operates on them.

pub mod chain;
pub mod engine;
pub mod merges;
pub mod priority;
pub mod vocab;

pub use chain::{NodeId, SegmentChain, SegmentNode};
pub use engine::{MergeEngine, MergeStats};
pub use merges::{MergeMap, MergeRules, Pair};
pub use priority::{CandidateQueue, MergeCandidate, MergePriority};
pub use vocab::{SpecialTokens, SpecialTokensConfig, Vocab, VocabR, Vocabulary};
