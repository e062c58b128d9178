//! Priority-queue driven BPE merge engine.
//!
//! Merges the initial per-character tokens of a prompt greedily: the pending
//! merge with the lowest rank fires first, and among equal ranks the leftmost
//! one. Each merge touches only its neighbourhood, giving O(n log n) overall.
//!
//! Candidates are never removed from the queue. Instead, every node whose
//! pending candidates could now produce a wrong merge is tombstoned:
//! the two merged nodes, and the node to their left, which is swapped for an
//! identical fresh copy. A popped candidate whose left node or right
//! neighbour is tombstoned is skipped.

use crate::core::chain::{NodeId, SegmentChain, SegmentNode};
use crate::core::merges::MergeRules;
use crate::core::priority::{CandidateQueue, MergeCandidate};

/// Counters collected while merging one prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Tokens before merging
    pub initial_tokens: usize,
    /// Tokens after merging
    pub final_tokens: usize,
    /// Merges applied
    pub merges: usize,
    /// Popped candidates skipped as stale
    pub stale: usize,
}

/// Applies merge rules to an initial token sequence.
#[derive(Debug, Clone, Copy)]
pub struct MergeEngine<'a> {
    rules: &'a MergeRules,
}

impl<'a> MergeEngine<'a> {
    pub fn new(rules: &'a MergeRules) -> Self {
        Self { rules }
    }

    /// Merge `tokens` until no adjacent pair has a rule.
    pub fn merge(&self, tokens: &[u32]) -> Vec<u32> {
        self.merge_with_stats(tokens).0
    }

    /// Like [`MergeEngine::merge`], also returning counters.
    pub fn merge_with_stats(&self, tokens: &[u32]) -> (Vec<u32>, MergeStats) {
        let mut stats = MergeStats {
            initial_tokens: tokens.len(),
            ..Default::default()
        };

        if tokens.len() < 2 {
            stats.final_tokens = tokens.len();
            return (tokens.to_vec(), stats);
        }

        let mut chain = SegmentChain::from_tokens(tokens);
        let mut queue = CandidateQueue::with_capacity(tokens.len());

        for left in 0..tokens.len() - 1 {
            self.enqueue(&chain, &mut queue, left);
        }

        while let Some(candidate) = queue.pop() {
            let left = candidate.left;
            let Some(right) = chain.live_next(left) else {
                stats.stale += 1;
                continue;
            };

            chain.tombstone(left);
            chain.tombstone(right);

            // Pending candidates of the left neighbour were computed against
            // `left`; retire them by swapping in a copy.
            let prev = chain[left]
                .prev
                .map(|old_prev| chain.replace_with_copy(old_prev));
            let next = chain[right].next;

            let result = chain.push(SegmentNode {
                token_id: candidate.merged,
                orig_pos: chain[left].orig_pos,
                deleted: false,
                prev,
                next,
            });
            chain.link_after(prev, result);
            if let Some(next) = next {
                chain.link_before(next, result);
            }

            if let Some(prev) = prev {
                self.enqueue(&chain, &mut queue, prev);
            }
            if next.is_some() {
                self.enqueue(&chain, &mut queue, result);
            }
            stats.merges += 1;
        }

        let merged = chain.token_ids();
        stats.final_tokens = merged.len();
        (merged, stats)
    }

    /// Queue the merge of `left` with its right neighbour, if a rule exists.
    #[inline]
    fn enqueue(&self, chain: &SegmentChain, queue: &mut CandidateQueue, left: NodeId) {
        let node = &chain[left];
        let Some(next) = node.next else {
            return;
        };

        if let Some((rank, merged)) = self.rules.get((node.token_id, chain[next].token_id)) {
            queue.push(MergeCandidate::new(rank, node.orig_pos, left, merged));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::{byte_token_string, SpecialTokensConfig, Vocabulary, SPACE_GLYPH};

    fn fixture() -> (Vocabulary, MergeRules) {
        let mut tokens = vec!["<unk>".to_string(), "<s>".to_string(), "</s>".to_string()];
        tokens.extend((0..=255u8).map(byte_token_string));
        tokens.extend([SPACE_GLYPH, "▁▁", "▁▁▁▁"].map(String::from));
        tokens.extend(["a", "b", "c", "ab", "abc", "▁a", "x", "xx", "xxx"].map(String::from));
        let vocab = Vocabulary::from_tokens(tokens, &SpecialTokensConfig::default()).unwrap();

        let id = |s: &str| vocab.get_id(s).unwrap();
        let pairs = vec![
            (id(SPACE_GLYPH), id(SPACE_GLYPH)),
            (id("▁▁"), id("▁▁")),
            (id("a"), id("b")),
            (id("ab"), id("c")),
            (id(SPACE_GLYPH), id("a")),
            (id("x"), id("x")),
            (id("xx"), id("x")),
        ];
        let rules = MergeRules::from_pairs(&vocab, pairs).unwrap();
        (vocab, rules)
    }

    fn ids(vocab: &Vocabulary, tokens: &[&str]) -> Vec<u32> {
        tokens.iter().map(|t| vocab.get_id(t).unwrap()).collect()
    }

    #[test]
    fn test_no_merges() {
        let (vocab, rules) = fixture();
        let engine = MergeEngine::new(&rules);

        let input = ids(&vocab, &["c", "b", "a"]);
        assert_eq!(engine.merge(&input), input);
        assert!(engine.merge(&[]).is_empty());
        assert_eq!(engine.merge(&[7]), vec![7]);
    }

    #[test]
    fn test_chained_merges() {
        let (vocab, rules) = fixture();
        let engine = MergeEngine::new(&rules);

        let input = ids(&vocab, &["a", "b", "c"]);
        assert_eq!(engine.merge(&input), ids(&vocab, &["abc"]));
    }

    #[test]
    fn test_lower_rank_wins() {
        let (vocab, rules) = fixture();
        let engine = MergeEngine::new(&rules);

        // ("a","b") outranks ("▁","a"); the stale ("▁","a") candidate must
        // not fire against the merged "abc".
        let input = ids(&vocab, &[SPACE_GLYPH, "a", "b", "c"]);
        let (merged, stats) = engine.merge_with_stats(&input);

        assert_eq!(merged, ids(&vocab, &[SPACE_GLYPH, "abc"]));
        assert_eq!(stats.merges, 2);
        assert!(stats.stale >= 1);
    }

    #[test]
    fn test_eleven_spaces_merge_left_to_right() {
        let (vocab, rules) = fixture();
        let engine = MergeEngine::new(&rules);

        let input = vec![vocab.get_id(SPACE_GLYPH).unwrap(); 11];
        assert_eq!(
            engine.merge(&input),
            ids(&vocab, &["▁▁▁▁", "▁▁▁▁", "▁▁", SPACE_GLYPH])
        );
    }

    #[test]
    fn test_odd_run_leaves_rightmost() {
        let (vocab, rules) = fixture();
        let engine = MergeEngine::new(&rules);

        // "xx" pairs up from the left, then "xx"+"x" is the only rule left.
        let input = ids(&vocab, &["x", "x", "x"]);
        assert_eq!(engine.merge(&input), ids(&vocab, &["xxx"]));

        let input = ids(&vocab, &["x", "x", "x", "x"]);
        assert_eq!(engine.merge(&input), ids(&vocab, &["xx", "xx"]));
    }

    #[test]
    fn test_merge_stats() {
        let (vocab, rules) = fixture();
        let engine = MergeEngine::new(&rules);

        let input = ids(&vocab, &["a", "b", "a", "b"]);
        let (merged, stats) = engine.merge_with_stats(&input);

        assert_eq!(merged, ids(&vocab, &["ab", "ab"]));
        assert_eq!(stats.initial_tokens, 4);
        assert_eq!(stats.final_tokens, 2);
        assert_eq!(stats.merges, 2);
    }

    #[test]
    fn test_deterministic() {
        let (vocab, rules) = fixture();
        let engine = MergeEngine::new(&rules);

        let input = ids(
            &vocab,
            &[SPACE_GLYPH, SPACE_GLYPH, "a", "b", "c", "x", "x", "x", SPACE_GLYPH, "a"],
        );
        assert_eq!(engine.merge(&input), engine.merge(&input));
    }
}
