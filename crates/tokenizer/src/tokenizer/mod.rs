//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties the
//! vocabulary, the merge table and the LLaMA encoder to a configuration.

use llamatok_core::{
    LlamaEncoder, MergeRules, Pair, Result, SpecialTokensConfig, TokenizerError, Vocabulary,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Prepend the begin-of-text token by default
    pub add_bos_token: bool,
    /// Prepend a space to the text by default
    pub add_preceding_space: bool,
    /// Log the running time of every encode call
    pub log_performance: bool,
    /// Special tokens configuration
    pub special_tokens: SpecialTokensConfig,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            add_bos_token: true,
            add_preceding_space: true,
            log_performance: false,
            special_tokens: SpecialTokensConfig::default(),
        }
    }
}

impl TokenizerConfig {
    /// Default per-call options derived from this configuration.
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            add_bos_token: self.add_bos_token,
            add_preceding_space: self.add_preceding_space,
        }
    }
}

/// Per-call encode/decode flags.
///
/// Decoding must use the same flags as the encode that produced the IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub add_bos_token: bool,
    pub add_preceding_space: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            add_bos_token: true,
            add_preceding_space: true,
        }
    }
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
    vocab: Option<Vec<String>>,
    merges: Option<Vec<Pair>>,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vocabulary; the position of each token is its ID.
    pub fn vocab<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocab = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Set the merges in training order (the first pair has the lowest rank).
    pub fn merges(mut self, pairs: impl IntoIterator<Item = Pair>) -> Self {
        self.merges = Some(pairs.into_iter().collect());
        self
    }

    /// Set special tokens.
    pub fn special_tokens(mut self, tokens: SpecialTokensConfig) -> Self {
        self.config.special_tokens = tokens;
        self
    }

    /// Set whether the begin-of-text token is prepended by default.
    pub fn add_bos_token(mut self, add: bool) -> Self {
        self.config.add_bos_token = add;
        self
    }

    /// Set whether a space is prepended to the text by default.
    pub fn add_preceding_space(mut self, add: bool) -> Self {
        self.config.add_preceding_space = add;
        self
    }

    /// Enable timing logs for every encode call.
    pub fn log_performance(mut self, enabled: bool) -> Self {
        self.config.log_performance = enabled;
        self
    }

    /// Build the tokenizer.
    ///
    /// Fails if the vocabulary or merge table was not supplied or is invalid.
    pub fn build(self) -> Result<Tokenizer> {
        let tokens = self.vocab.ok_or_else(|| {
            TokenizerError::NotInitialized("no vocabulary supplied".to_string())
        })?;
        let pairs = self.merges.ok_or_else(|| {
            TokenizerError::NotInitialized("no merge table supplied".to_string())
        })?;

        let vocab = Vocabulary::from_tokens(&tokens, &self.config.special_tokens)?;
        let merges = MergeRules::from_pairs(&vocab, pairs)?;

        Ok(Tokenizer::from_tables(vocab, merges, self.config))
    }
}

/// Main tokenizer struct.
///
/// Immutable once built; share it across threads freely.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    encoder: LlamaEncoder,
    config: TokenizerConfig,
}

impl Tokenizer {
    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Create a tokenizer from already built tables.
    pub fn from_tables(vocab: Vocabulary, merges: MergeRules, config: TokenizerConfig) -> Self {
        Self {
            encoder: LlamaEncoder::with_arcs(Arc::new(vocab), Arc::new(merges)),
            config,
        }
    }

    /// Encode text with the configured default flags.
    pub fn encode(&self, text: &str) -> Encoding {
        self.encode_with(text, self.config.encode_options())
    }

    /// Encode text with explicit flags.
    ///
    /// Empty text always yields an empty encoding.
    pub fn encode_with(&self, text: &str, options: EncodeOptions) -> Encoding {
        let start = self.config.log_performance.then(Instant::now);

        let ids = self
            .encoder
            .encode(text, options.add_bos_token, options.add_preceding_space);

        if let Some(start) = start {
            info!(
                elapsed_us = start.elapsed().as_micros() as u64,
                chars = text.chars().count(),
                tokens = ids.len(),
                "tokenizer running time"
            );
        }

        Encoding {
            ids,
            text: text.to_string(),
        }
    }

    /// Encode a batch of texts (parallelized across texts).
    pub fn encode_batch(&self, texts: &[String]) -> Vec<Encoding> {
        use rayon::prelude::*;

        let options = self.config.encode_options();
        texts
            .par_iter()
            .map(|text| self.encode_with(text, options))
            .collect()
    }

    /// Decode token IDs with the configured default flags.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.decode_with(ids, self.config.encode_options())
    }

    /// Decode token IDs with explicit flags.
    pub fn decode_with(&self, ids: &[u32], options: EncodeOptions) -> Result<String> {
        self.encoder
            .decode(ids, options.add_bos_token, options.add_preceding_space)
    }

    /// Map token IDs to their token strings.
    pub fn tokens(&self, ids: &[u32]) -> Result<Vec<&str>> {
        let vocab = self.encoder.vocab();
        ids.iter()
            .map(|&id| {
                vocab
                    .get_token(id)
                    .ok_or(TokenizerError::UnknownTokenId(id))
            })
            .collect()
    }

    /// Look up the ID of a token string.
    pub fn token_to_id(&self, token: &str) -> Result<u32> {
        self.encoder
            .vocab()
            .get_id(token)
            .ok_or_else(|| TokenizerError::UnknownToken(token.to_string()))
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.encoder.vocab().len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        self.encoder.vocab()
    }

    /// Get a reference to the merge table.
    pub fn merges(&self) -> &MergeRules {
        self.encoder.merges()
    }

    /// Get the configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Get the underlying encoder.
    pub fn encoder(&self) -> &LlamaEncoder {
        &self.encoder
    }

    /// Save the tokenizer to a directory as `tokenizer.json`.
    pub fn save(&self, path: &Path) -> Result<()> {
        use crate::io::TokenizerSaver;

        TokenizerSaver::new(self.vocab(), self.merges(), &self.config.special_tokens).save(path)
    }

    /// Save the tokenizer to a directory in the packaged base64 format.
    pub fn save_packaged(&self, path: &Path) -> Result<()> {
        use crate::io::TokenizerSaver;

        TokenizerSaver::new(self.vocab(), self.merges(), &self.config.special_tokens)
            .save_packaged(path)
    }

    /// Load a tokenizer from a directory.
    ///
    /// Reads `tokenizer.json` if present, otherwise the packaged
    /// `vocab_base64.txt` + `merges_binary.txt` pair.
    pub fn load(path: &Path) -> Result<Self> {
        use crate::io::TokenizerLoader;

        let serialized = TokenizerLoader::load(path)?;
        serialized.into_builder().build()
    }

    /// Build a tokenizer from the packaged base64 strings.
    pub fn from_packaged(vocab_base64: &str, merges_binary: &str) -> Result<Self> {
        use crate::io::TokenizerLoader;

        TokenizerLoader::from_packaged(vocab_base64, merges_binary)?
            .into_builder()
            .build()
    }
}

/// Result of encoding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Token IDs
    pub ids: Vec<u32>,
    /// Original text
    pub text: String,
}

impl Encoding {
    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
