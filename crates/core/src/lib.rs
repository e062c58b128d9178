//! llamatok-core - LLaMA BPE tables and merge engine
//!
//! This crate provides the vocabulary store, the merge rule table and the
//! priority-queue merge engine that reproduce LLaMA tokenization, together
//! with the segmentation and detokenization steps around it.
//!
//! # Features
//!
//! - Immutable vocabulary with `AHashMap` + `CompactString` lookups
//! - Merge ranks keyed by token ID pair, merged IDs resolved up front
//! - O(n log n) merging with an 8-ary heap and an arena-backed segment chain
//! - Byte-level fallback for characters outside the vocabulary
//!
//! # Example
//!
//! ```rust
//! use llamatok_core::{LlamaEncoder, MergeRules, SpecialTokensConfig, Vocabulary};
//!
//! let tokens = ["<unk>", "<s>", "</s>", "\u{2581}", "h", "i", "hi", "\u{2581}hi"];
//! let vocab = Vocabulary::from_tokens(tokens, &SpecialTokensConfig::default())?;
//! let merges = MergeRules::from_flat(&vocab, &[4, 5, 3, 6])?;
//!
//! let encoder = LlamaEncoder::new(vocab, merges);
//! let ids = encoder.encode("hi", true, true);
//! assert_eq!(ids, vec![1, 7]);
//! assert_eq!(encoder.decode(&ids, true, true)?, "hi");
//! # Ok::<(), llamatok_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE algorithm modules
pub mod core;
pub use crate::core::vocab::{byte_token_string, parse_byte_token, SPACE_GLYPH};
pub use crate::core::{
    MergeEngine, MergeMap, MergeRules, MergeStats, Pair, SpecialTokens, SpecialTokensConfig,
    Vocab, VocabR, Vocabulary,
};

// Encoding pipeline
pub mod encoding;
pub use encoding::{Detokenizer, LlamaEncoder, Segmenter};
