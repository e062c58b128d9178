//! Detokenization: token IDs back to text.

use crate::core::vocab::Vocabulary;
use crate::error::{Result, TokenizerError};

/// Reconstructs text from token IDs; the inverse of segmentation plus merging.
#[derive(Debug, Clone, Copy)]
pub struct Detokenizer<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> Detokenizer<'a> {
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Decode `ids` to text.
    ///
    /// Bytes of all tokens are gathered first and decoded as one UTF-8 buffer,
    /// so a character split over several byte-level tokens comes back whole.
    /// Invalid UTF-8 decodes to U+FFFD. The unknown token carries no text and
    /// is dropped.
    ///
    /// The preceding space is removed from the decoded string, not from the
    /// tokens, because it is usually merged into the first word's token.
    pub fn detokenize(
        &self,
        ids: &[u32],
        had_bos_token: bool,
        had_preceding_space: bool,
    ) -> Result<String> {
        let ids = if had_bos_token {
            ids.get(1..).unwrap_or_default()
        } else {
            ids
        };
        let unk = self.vocab.special().unk;

        let mut bytes = Vec::with_capacity(ids.len() * 4);
        for &id in ids {
            if id == unk {
                continue;
            }
            let token = self
                .vocab
                .get_token(id)
                .ok_or(TokenizerError::UnknownTokenId(id))?;

            match self.vocab.byte_value(id) {
                Some(byte) => bytes.push(byte),
                None => bytes.extend_from_slice(token.as_bytes()),
            }
        }

        let text = String::from_utf8_lossy(&bytes).replace(self.vocab.space_glyph(), " ");

        if had_preceding_space {
            let mut chars = text.chars();
            chars.next();
            Ok(chars.as_str().to_string())
        } else {
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::{byte_token_string, SpecialTokensConfig, SPACE_GLYPH};

    fn vocab() -> Vocabulary {
        let mut tokens = vec!["<unk>".to_string(), "<s>".to_string(), "</s>".to_string()];
        tokens.extend((0..=255u8).map(byte_token_string));
        for t in [SPACE_GLYPH, "▁▁", "h", "i", "▁hi"] {
            tokens.push(t.to_string());
        }
        Vocabulary::from_tokens(tokens, &SpecialTokensConfig::default()).unwrap()
    }

    fn ids(vocab: &Vocabulary, tokens: &[&str]) -> Vec<u32> {
        tokens.iter().map(|t| vocab.get_id(t).unwrap()).collect()
    }

    #[test]
    fn test_flags() {
        let vocab = vocab();
        let detok = Detokenizer::new(&vocab);

        assert_eq!(
            detok.detokenize(&ids(&vocab, &["<s>", "▁hi"]), true, true).unwrap(),
            "hi"
        );
        assert_eq!(
            detok.detokenize(&ids(&vocab, &["▁hi"]), false, false).unwrap(),
            " hi"
        );
        assert_eq!(
            detok.detokenize(&ids(&vocab, &["h", "i"]), false, false).unwrap(),
            "hi"
        );
    }

    #[test]
    fn test_preceding_space_removed_from_merged_run() {
        let vocab = vocab();
        let detok = Detokenizer::new(&vocab);

        // Preceding space plus one real space merged into a single token
        let decoded = detok
            .detokenize(&ids(&vocab, &["▁▁", "h", "i"]), false, true)
            .unwrap();
        assert_eq!(decoded, " hi");
    }

    #[test]
    fn test_split_multibyte_reassembled() {
        let vocab = vocab();
        let detok = Detokenizer::new(&vocab);

        let mut input: Vec<u32> = "é😀".bytes().map(|b| vocab.byte_id(b).unwrap()).collect();
        input.push(vocab.get_id("h").unwrap());

        assert_eq!(detok.detokenize(&input, false, false).unwrap(), "é😀h");
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let vocab = vocab();
        let detok = Detokenizer::new(&vocab);

        let input = vec![vocab.byte_id(0xE2).unwrap(), vocab.get_id("h").unwrap()];
        assert_eq!(detok.detokenize(&input, false, false).unwrap(), "\u{FFFD}h");
    }

    #[test]
    fn test_unknown_token_dropped() {
        let vocab = vocab();
        let detok = Detokenizer::new(&vocab);

        let input = ids(&vocab, &["h", "<unk>", "i"]);
        assert_eq!(detok.detokenize(&input, false, false).unwrap(), "hi");
    }

    #[test]
    fn test_unknown_id() {
        let vocab = vocab();
        let detok = Detokenizer::new(&vocab);

        let err = detok.detokenize(&[100_000], false, false).unwrap_err();
        assert!(matches!(err, TokenizerError::UnknownTokenId(100_000)));
    }

    #[test]
    fn test_empty() {
        let vocab = vocab();
        let detok = Detokenizer::new(&vocab);

        assert_eq!(detok.detokenize(&[], true, true).unwrap(), "");
    }
}
