//! LLaMA-style BPE encoding.
//!
//! Text is segmented into one token per character (with byte fallback), then
//! merged by rank with the priority-queue merge engine. Decoding reverses
//! both steps.

use crate::core::{MergeEngine, MergeRules, MergeStats, Vocabulary};
use crate::encoding::{Detokenizer, Segmenter};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// LLaMA BPE encoder over a shared vocabulary and merge table.
///
/// Both tables are immutable; cloning the encoder only bumps reference counts.
#[derive(Debug, Clone)]
pub struct LlamaEncoder {
    vocab: Arc<Vocabulary>,
    merges: Arc<MergeRules>,
}

impl LlamaEncoder {
    /// Create a new encoder taking ownership of the tables.
    pub fn new(vocab: Vocabulary, merges: MergeRules) -> Self {
        Self::with_arcs(Arc::new(vocab), Arc::new(merges))
    }

    /// Create a new encoder sharing already `Arc`-wrapped tables.
    pub fn with_arcs(vocab: Arc<Vocabulary>, merges: Arc<MergeRules>) -> Self {
        Self { vocab, merges }
    }

    /// Encode text to token IDs.
    ///
    /// Empty text yields no tokens regardless of the flags.
    pub fn encode(&self, text: &str, add_bos_token: bool, add_preceding_space: bool) -> Vec<u32> {
        self.encode_with_stats(text, add_bos_token, add_preceding_space).0
    }

    /// Encode text, also returning merge counters.
    pub fn encode_with_stats(
        &self,
        text: &str,
        add_bos_token: bool,
        add_preceding_space: bool,
    ) -> (Vec<u32>, MergeStats) {
        let initial =
            Segmenter::new(&self.vocab).segment(text, add_bos_token, add_preceding_space);
        let (ids, stats) = MergeEngine::new(&self.merges).merge_with_stats(&initial);

        debug!(
            initial = stats.initial_tokens,
            merged = stats.final_tokens,
            merges = stats.merges,
            stale = stats.stale,
            "encoded prompt"
        );

        (ids, stats)
    }

    /// Decode token IDs back to text.
    ///
    /// The flags must match the ones used for encoding.
    pub fn decode(
        &self,
        ids: &[u32],
        add_bos_token: bool,
        add_preceding_space: bool,
    ) -> Result<String> {
        Detokenizer::new(&self.vocab).detokenize(ids, add_bos_token, add_preceding_space)
    }

    /// Shared vocabulary.
    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Shared merge table.
    pub fn merges(&self) -> &Arc<MergeRules> {
        &self.merges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::{byte_token_string, SpecialTokensConfig, SPACE_GLYPH};

    fn encoder() -> LlamaEncoder {
        let mut tokens = vec!["<unk>".to_string(), "<s>".to_string(), "</s>".to_string()];
        tokens.extend((0..=255u8).map(byte_token_string));
        tokens.extend([SPACE_GLYPH, "▁▁", "▁▁▁▁"].map(String::from));
        tokens.extend(["h", "e", "l", "o", "w", "r", "d"].map(String::from));
        tokens.extend(["ll", "he", "llo", "hello", "▁hello"].map(String::from));
        tokens.extend(["▁w", "or", "▁wor", "ld", "▁world"].map(String::from));
        let vocab = Vocabulary::from_tokens(tokens, &SpecialTokensConfig::default()).unwrap();

        let id = |s: &str| vocab.get_id(s).unwrap();
        let pairs = vec![
            (id(SPACE_GLYPH), id(SPACE_GLYPH)),
            (id("▁▁"), id("▁▁")),
            (id("l"), id("l")),
            (id("h"), id("e")),
            (id("ll"), id("o")),
            (id("he"), id("llo")),
            (id(SPACE_GLYPH), id("hello")),
            (id(SPACE_GLYPH), id("w")),
            (id("o"), id("r")),
            (id("▁w"), id("or")),
            (id("l"), id("d")),
            (id("▁wor"), id("ld")),
        ];
        let merges = MergeRules::from_pairs(&vocab, pairs).unwrap();
        LlamaEncoder::new(vocab, merges)
    }

    fn ids(encoder: &LlamaEncoder, tokens: &[&str]) -> Vec<u32> {
        tokens
            .iter()
            .map(|t| encoder.vocab().get_id(t).unwrap())
            .collect()
    }

    #[test]
    fn test_encode_word() {
        let encoder = encoder();

        assert_eq!(
            encoder.encode("hello", true, true),
            ids(&encoder, &["<s>", "▁hello"])
        );
        let encoded = encoder.encode("hello", true, true);
        assert_eq!(encoder.decode(&encoded, true, true).unwrap(), "hello");
    }

    #[test]
    fn test_encode_sentence() {
        let encoder = encoder();

        assert_eq!(
            encoder.encode("hello world", true, true),
            ids(&encoder, &["<s>", "▁hello", "▁world"])
        );
        assert_eq!(
            encoder.encode("hello world", false, false),
            ids(&encoder, &["hello", "▁world"])
        );
    }

    #[test]
    fn test_empty() {
        let encoder = encoder();

        for (bos, space) in [(true, true), (true, false), (false, true), (false, false)] {
            assert!(encoder.encode("", bos, space).is_empty());
        }
    }

    #[test]
    fn test_eleven_spaces() {
        let encoder = encoder();
        let text = " ".repeat(11);

        assert_eq!(
            encoder.encode(&text, false, false),
            ids(&encoder, &["▁▁▁▁", "▁▁▁▁", "▁▁", SPACE_GLYPH])
        );
        // The preceding space makes the run twelve long.
        assert_eq!(
            encoder.encode(&text, true, true),
            ids(&encoder, &["<s>", "▁▁▁▁", "▁▁▁▁", "▁▁▁▁"])
        );
    }

    #[test]
    fn test_flags_are_independent() {
        let encoder = encoder();
        let bos = encoder.vocab().special().bos;
        let space = encoder.vocab().special().space;

        let bare = encoder.encode("dr", false, false);
        assert_eq!(bare, ids(&encoder, &["d", "r"]));

        let mut with_bos = vec![bos];
        with_bos.extend(&bare);
        assert_eq!(encoder.encode("dr", true, false), with_bos);

        let mut with_space = vec![space];
        with_space.extend(&bare);
        assert_eq!(encoder.encode("dr", false, true), with_space);

        let mut with_both = vec![bos, space];
        with_both.extend(&bare);
        assert_eq!(encoder.encode("dr", true, true), with_both);
    }

    #[test]
    fn test_roundtrip() {
        let encoder = encoder();
        let texts = [
            "hello",
            "hello world",
            "  hello   world  ",
            " ",
            "héllo wörld 😀\n\ttabs",
            "€€€ 日本語",
            "world hello hellohello",
        ];

        for text in texts {
            for (bos, space) in [(true, true), (true, false), (false, true), (false, false)] {
                let encoded = encoder.encode(text, bos, space);
                let decoded = encoder.decode(&encoded, bos, space).unwrap();
                assert_eq!(decoded, text, "flags bos={} space={}", bos, space);
            }
        }
    }

    #[test]
    fn test_byte_fallback_roundtrip() {
        let encoder = encoder();

        // 1-byte, 2-byte, 3-byte and 4-byte code points with no separator
        let text = "\né€😀";
        let encoded = encoder.encode(text, false, false);
        let expected: Vec<u32> = text
            .bytes()
            .map(|b| encoder.vocab().byte_id(b).unwrap())
            .collect();

        assert_eq!(encoded, expected);
        assert_eq!(encoder.decode(&encoded, false, false).unwrap(), text);
    }

    #[test]
    fn test_deterministic() {
        let encoder = encoder();
        let text = "hello  world, hello!";

        assert_eq!(encoder.encode(text, true, true), encoder.encode(text, true, true));
    }

    #[test]
    fn test_stats() {
        let encoder = encoder();
        let (ids, stats) = encoder.encode_with_stats("hello", false, false);

        assert_eq!(ids.len(), 1);
        assert_eq!(stats.initial_tokens, 5);
        assert_eq!(stats.final_tokens, 1);
        assert_eq!(stats.merges, 4);
    }
}
