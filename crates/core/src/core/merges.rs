//! Merge rule management for BPE.
//!
//! Merge rules are keyed by the pair of token IDs rather than by the token
//! strings; since the vocabulary is a bijection the ID pair identifies the
//! string pair uniquely. The merged token ID is resolved once, when the table
//! is built, so the merge engine never has to look strings up.

use crate::core::vocab::Vocabulary;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;

/// A pair of token IDs that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, new_token_id).
///
/// The rank indicates the priority of this merge rule (lower rank = higher priority).
/// The new_token_id is the ID of the token created by merging this pair.
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// Collection of BPE merge rules with efficient lookup.
#[derive(Debug, Clone)]
pub struct MergeRules {
    /// Merge rules: pair -> (rank, new_token_id)
    merges: MergeMap,
    /// Maximum rank
    max_rank: u32,
}

impl MergeRules {
    /// Build merge rules from pairs given in training order.
    ///
    /// The i-th pair gets rank `i + 1`; rank 0 is never assigned. A pair that
    /// appears twice keeps the rank of its last occurrence.
    ///
    /// Fails if a pair references an ID outside the vocabulary, or if the
    /// concatenation of the two token strings is not itself a token.
    pub fn from_pairs(vocab: &Vocabulary, pairs: impl IntoIterator<Item = Pair>) -> Result<Self> {
        let pairs = pairs.into_iter();
        let mut merges = MergeMap::with_capacity(pairs.size_hint().0);
        let mut max_rank = 0;

        for (index, (left, right)) in pairs.enumerate() {
            let rank = u32::try_from(index + 1).map_err(|_| {
                TokenizerError::InvalidMerge(format!("Merge rank {} exceeds u32", index + 1))
            })?;

            let token = |id: u32| {
                vocab.get_token(id).ok_or_else(|| {
                    TokenizerError::InvalidMerge(format!(
                        "Merge {} references unknown token ID {}",
                        rank, id
                    ))
                })
            };
            let left_str = token(left)?;
            let right_str = token(right)?;

            let merged = format!("{}{}", left_str, right_str);
            let new_token_id = vocab.get_id(&merged).ok_or_else(|| {
                TokenizerError::InvalidMerge(format!(
                    "Merge {} ({:?} + {:?}) produces {:?}, which is not in the vocabulary",
                    rank, left_str, right_str, merged
                ))
            })?;

            merges.insert((left, right), (rank, new_token_id));
            max_rank = rank;
        }

        Ok(Self { merges, max_rank })
    }

    /// Build merge rules from a flat ID sequence, two IDs per merge.
    pub fn from_flat(vocab: &Vocabulary, ids: &[u32]) -> Result<Self> {
        if ids.len() % 2 != 0 {
            return Err(TokenizerError::InvalidMerge(format!(
                "Flat merge sequence has odd length {}",
                ids.len()
            )));
        }

        Self::from_pairs(vocab, ids.chunks_exact(2).map(|pair| (pair[0], pair[1])))
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns Some((rank, new_token_id)) if this pair should be merged,
    /// None otherwise.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, u32)> {
        self.merges.get(&pair).copied()
    }

    /// Get the rank of merging `left` followed by `right`.
    #[inline]
    pub fn rank_of(&self, left: u32, right: u32) -> Option<u32> {
        self.get((left, right)).map(|(rank, _)| rank)
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    /// Highest assigned rank.
    #[inline]
    pub fn max_rank(&self) -> u32 {
        self.max_rank
    }

    /// Pairs in rank order, the inverse of [`MergeRules::from_pairs`].
    pub fn ordered_pairs(&self) -> Vec<Pair> {
        let mut ranked: Vec<(u32, Pair)> = self
            .merges
            .iter()
            .map(|(&pair, &(rank, _))| (rank, pair))
            .collect();
        ranked.sort_unstable();
        ranked.into_iter().map(|(_, pair)| pair).collect()
    }
}
