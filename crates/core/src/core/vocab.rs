//! Vocabulary storage and lookup.
//!
//! The vocabulary is an immutable bijection between token ids and token strings.
//! Ids are dense (`0..len`), so the reverse mapping is a plain `Vec` indexed by id,
//! while the forward mapping uses `AHashMap` with `CompactString` keys.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Reverse mapping: ID -> token string (index = ID)
pub type VocabR = Vec<CompactString>;

/// The glyph LLaMA vocabularies use in place of the ASCII space.
pub const SPACE_GLYPH: &str = "\u{2581}";

/// Format the reserved byte-level token string for a raw byte, e.g. `<0x0A>`.
pub fn byte_token_string(byte: u8) -> String {
    format!("<0x{:02X}>", byte)
}

/// Parse a byte-level token string (`<0xHH>`) back into its byte value.
///
/// Returns `None` for any other token string.
pub fn parse_byte_token(token: &str) -> Option<u8> {
    let hex = token.strip_prefix("<0x")?.strip_suffix('>')?;
    if hex.len() != 2 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(hex, 16).ok()
}

/// Vocabulary with forward and reverse mappings.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Forward mapping: token string -> ID
    vocab: Vocab,
    /// Reverse mapping: ID -> token string
    vocab_r: VocabR,
    /// Reserved token IDs (cached for fast access)
    special: SpecialTokens,
    /// Byte value -> ID of its `<0xHH>` token
    byte_tokens: [Option<u32>; 256],
}

impl Vocabulary {
    /// Build a vocabulary from an ordered token list, where position is the token ID.
    ///
    /// Fails if a token string repeats, or if one of the reserved tokens named by
    /// `special` (unknown, begin, space glyph) is missing.
    pub fn from_tokens<I, S>(tokens: I, special: &SpecialTokensConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens.into_iter();
        let (lower, _) = tokens.size_hint();
        let mut vocab = Vocab::with_capacity(lower);
        let mut vocab_r = VocabR::with_capacity(lower);

        for token in tokens {
            let token = CompactString::new(token.as_ref());
            let id = u32::try_from(vocab_r.len()).map_err(|_| {
                TokenizerError::VocabularyOverflow {
                    max: u32::MAX as usize,
                    tried: vocab_r.len() + 1,
                }
            })?;

            if let Some(existing) = vocab.insert(token.clone(), id) {
                return Err(TokenizerError::InvalidConfig(format!(
                    "Token {:?} appears twice (IDs {} and {})",
                    token.as_str(),
                    existing,
                    id
                )));
            }
            vocab_r.push(token);
        }

        if vocab_r.is_empty() {
            return Err(TokenizerError::NotInitialized(
                "vocabulary is empty".to_string(),
            ));
        }

        let special = SpecialTokens::resolve(&vocab, special)?;

        let mut byte_tokens = [None; 256];
        for (byte, slot) in byte_tokens.iter_mut().enumerate() {
            *slot = vocab.get(byte_token_string(byte as u8).as_str()).copied();
        }

        Ok(Self {
            vocab,
            vocab_r,
            special,
            byte_tokens,
        })
    }

    /// Get the ID for a token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(id as usize).map(|s| s.as_str())
    }

    /// Get the ID of the single-character token for `c`, if there is one.
    #[inline]
    pub fn char_id(&self, c: char) -> Option<u32> {
        let mut buf = [0u8; 4];
        self.get_id(c.encode_utf8(&mut buf))
    }

    /// Get the ID of the byte-level token for a raw byte.
    #[inline]
    pub fn byte_id(&self, byte: u8) -> Option<u32> {
        self.byte_tokens[byte as usize]
    }

    /// Get the byte value carried by a byte-level token ID.
    pub fn byte_value(&self, id: u32) -> Option<u8> {
        self.get_token(id).and_then(parse_byte_token)
    }

    /// Get the reserved token IDs.
    #[inline]
    pub fn special(&self) -> &SpecialTokens {
        &self.special
    }

    /// The string the space glyph token maps to.
    pub fn space_glyph(&self) -> &str {
        &self.vocab_r[self.special.space as usize]
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab_r.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab_r.is_empty()
    }

    /// Iterate over `(id, token)` in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.vocab_r
            .iter()
            .enumerate()
            .map(|(id, token)| (id as u32, token.as_str()))
    }
}

/// Reserved token IDs cached for fast access.
///
/// Unknown, begin and space are required by the encoder; end-of-text is
/// optional since encoding never emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    /// Unknown token ID
    pub unk: u32,
    /// Beginning of sequence token ID
    pub bos: u32,
    /// End of sequence token ID
    pub eos: Option<u32>,
    /// Space glyph token ID
    pub space: u32,
}

impl SpecialTokens {
    fn resolve(vocab: &Vocab, config: &SpecialTokensConfig) -> Result<Self> {
        // Segmentation looks characters up one at a time
        if config.space.chars().count() != 1 {
            return Err(TokenizerError::InvalidConfig(format!(
                "Space token {:?} must be a single character",
                config.space
            )));
        }

        let required = |role: &'static str, token: &str| {
            vocab
                .get(token)
                .copied()
                .ok_or_else(|| TokenizerError::MissingSpecialToken {
                    role,
                    token: token.to_string(),
                })
        };

        Ok(Self {
            unk: required("unknown", &config.unk)?,
            bos: required("begin-of-text", &config.bos)?,
            eos: vocab.get(config.eos.as_str()).copied(),
            space: required("space", &config.space)?,
        })
    }
}

/// Strings of the reserved tokens.
///
/// Defaults match the LLaMA vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialTokensConfig {
    pub unk: String,
    pub bos: String,
    pub eos: String,
    pub space: String,
}

impl Default for SpecialTokensConfig {
    fn default() -> Self {
        Self {
            unk: "<unk>".to_string(),
            bos: "<s>".to_string(),
            eos: "</s>".to_string(),
            space: SPACE_GLYPH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_tokens() -> Vec<String> {
        let mut tokens = vec!["<unk>".to_string(), "<s>".to_string(), "</s>".to_string()];
        tokens.extend((0..=255u8).map(byte_token_string));
        tokens.push(SPACE_GLYPH.to_string());
        tokens.push("a".to_string());
        tokens
    }

    #[test]
    fn test_from_tokens() {
        let vocab = Vocabulary::from_tokens(base_tokens(), &SpecialTokensConfig::default())
            .unwrap();

        assert_eq!(vocab.len(), 3 + 256 + 2);
        assert_eq!(vocab.get_id("<unk>"), Some(0));
        assert_eq!(vocab.get_token(1), Some("<s>"));
        assert_eq!(vocab.get_id("a"), Some(260));
        assert_eq!(vocab.char_id('a'), Some(260));
        assert_eq!(vocab.char_id('z'), None);
        assert_eq!(vocab.get_token(10_000), None);
    }

    #[test]
    fn test_special_tokens() {
        let vocab = Vocabulary::from_tokens(base_tokens(), &SpecialTokensConfig::default())
            .unwrap();
        let special = vocab.special();

        assert_eq!(special.unk, 0);
        assert_eq!(special.bos, 1);
        assert_eq!(special.eos, Some(2));
        assert_eq!(special.space, 259);
        assert_eq!(vocab.space_glyph(), SPACE_GLYPH);
    }

    #[test]
    fn test_missing_special_token() {
        let tokens = vec!["<unk>", "<s>", "a"];
        let err = Vocabulary::from_tokens(tokens, &SpecialTokensConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            TokenizerError::MissingSpecialToken { role: "space", .. }
        ));
    }

    #[test]
    fn test_multi_char_space_token() {
        let mut tokens = base_tokens();
        tokens.push("__".to_string());
        let config = SpecialTokensConfig {
            space: "__".to_string(),
            ..Default::default()
        };

        let err = Vocabulary::from_tokens(tokens, &config).unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_duplicate_token() {
        let mut tokens = base_tokens();
        tokens.push("a".to_string());

        let err = Vocabulary::from_tokens(tokens, &SpecialTokensConfig::default()).unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_vocabulary() {
        let err = Vocabulary::from_tokens(Vec::<String>::new(), &SpecialTokensConfig::default())
            .unwrap_err();
        assert!(matches!(err, TokenizerError::NotInitialized(_)));
    }

    #[test]
    fn test_byte_tokens() {
        let vocab = Vocabulary::from_tokens(base_tokens(), &SpecialTokensConfig::default())
            .unwrap();

        assert_eq!(vocab.byte_id(0x00), Some(3));
        assert_eq!(vocab.byte_id(0x0A), Some(13));
        assert_eq!(vocab.byte_id(0xFF), Some(258));
        assert_eq!(vocab.byte_value(13), Some(0x0A));
        assert_eq!(vocab.byte_value(260), None);
    }

    #[test]
    fn test_byte_token_format() {
        assert_eq!(byte_token_string(0x0A), "<0x0A>");
        assert_eq!(byte_token_string(0xE2), "<0xE2>");
        assert_eq!(parse_byte_token("<0xE2>"), Some(0xE2));
        assert_eq!(parse_byte_token("<0xe2>"), Some(0xE2));
        assert_eq!(parse_byte_token("<0x>"), None);
        assert_eq!(parse_byte_token("<0xZZ>"), None);
        assert_eq!(parse_byte_token("<s>"), None);
    }
}
