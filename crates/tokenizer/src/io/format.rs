//! Serialization formats for tokenizer tables.
//!
//! Two on-disk layouts are supported:
//!
//! - **JSON**: a single `tokenizer.json` holding the token list, the merge
//!   pairs in training order and the special token strings.
//! - **Packaged**: the compact pair of base64 blobs LLaMA tables ship as.
//!   `vocab_base64` encodes the newline-separated UTF-8 token list (line
//!   number = token ID); `merges_binary` encodes a little-endian `u16` stream
//!   of token IDs, two per merge, in training order.

use crate::tokenizer::TokenizerBuilder;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use llamatok_core::{Pair, Result, SpecialTokensConfig, TokenizerError, Vocabulary};
use serde::{Deserialize, Serialize};

/// File name of the JSON format.
pub const TOKENIZER_JSON: &str = "tokenizer.json";
/// File name of the packaged vocabulary blob.
pub const VOCAB_BASE64: &str = "vocab_base64.txt";
/// File name of the packaged merges blob.
pub const MERGES_BINARY: &str = "merges_binary.txt";

/// Format version written to `tokenizer.json`.
pub const FORMAT_VERSION: &str = "1.0";

/// On-disk layout of a tokenizer directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// `tokenizer.json`
    Json,
    /// `vocab_base64.txt` + `merges_binary.txt`
    Packaged,
}

impl ModelFormat {
    /// Detect the layout of a directory; JSON wins if both are present.
    pub fn detect(path: &std::path::Path) -> Option<Self> {
        if path.join(TOKENIZER_JSON).is_file() {
            Some(Self::Json)
        } else if path.join(VOCAB_BASE64).is_file() && path.join(MERGES_BINARY).is_file() {
            Some(Self::Packaged)
        } else {
            None
        }
    }
}

/// Decoded tables, as stored in `tokenizer.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTokenizer {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub special_tokens: SpecialTokensConfig,
    /// Token strings; index = ID
    pub vocab: Vec<String>,
    /// Merge pairs in training order
    pub merges: Vec<Pair>,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

impl SerializedTokenizer {
    /// Turn the decoded tables into a builder with default flags.
    pub fn into_builder(self) -> TokenizerBuilder {
        TokenizerBuilder::new()
            .special_tokens(self.special_tokens)
            .vocab(self.vocab)
            .merges(self.merges)
    }
}

/// Codec for the packaged base64 format.
pub struct PackagedFormat;

impl PackagedFormat {
    /// Decode `vocab_base64` into the token list.
    pub fn decode_vocab(vocab_base64: &str) -> Result<Vec<String>> {
        let bytes = decode_base64(vocab_base64, "vocabulary")?;
        let text = String::from_utf8(bytes)
            .map_err(|e| TokenizerError::Load(format!("Vocabulary is not valid UTF-8: {}", e)))?;

        let text = text.strip_suffix('\n').unwrap_or(&text);
        Ok(text.split('\n').map(str::to_string).collect())
    }

    /// Decode `merges_binary` into merge pairs.
    pub fn decode_merges(merges_binary: &str) -> Result<Vec<Pair>> {
        let bytes = decode_base64(merges_binary, "merges")?;
        if bytes.len() % 4 != 0 {
            return Err(TokenizerError::Load(format!(
                "Merges blob has {} bytes, expected a multiple of 4 (two u16 IDs per merge)",
                bytes.len()
            )));
        }

        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| {
                let left = u16::from_le_bytes([chunk[0], chunk[1]]);
                let right = u16::from_le_bytes([chunk[2], chunk[3]]);
                (left as u32, right as u32)
            })
            .collect())
    }

    /// Encode a vocabulary as `vocab_base64`.
    pub fn encode_vocab(vocab: &Vocabulary) -> Result<String> {
        let mut text = String::new();
        for (id, token) in vocab.iter() {
            if token.contains('\n') {
                return Err(TokenizerError::Save(format!(
                    "Token {} contains a line break and cannot be packaged",
                    id
                )));
            }
            if id > 0 {
                text.push('\n');
            }
            text.push_str(token);
        }
        Ok(BASE64_STANDARD.encode(text.as_bytes()))
    }

    /// Encode merge pairs as `merges_binary`.
    pub fn encode_merges(pairs: &[Pair]) -> Result<String> {
        let mut bytes = Vec::with_capacity(pairs.len() * 4);
        for &(left, right) in pairs {
            for id in [left, right] {
                let id = u16::try_from(id).map_err(|_| {
                    TokenizerError::Save(format!(
                        "Token ID {} does not fit the packaged u16 merge format",
                        id
                    ))
                })?;
                bytes.extend_from_slice(&id.to_le_bytes());
            }
        }
        Ok(BASE64_STANDARD.encode(bytes))
    }
}

fn decode_base64(data: &str, what: &str) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(data.trim())
        .map_err(|e| TokenizerError::Load(format!("Invalid base64 in {}: {}", what, e)))
}
