//! llamatok-tokenizer - High-level LLaMA tokenizer API
//!
//! This crate wraps the vocabulary, merge table and encoder from
//! `llamatok-core` into a configurable `Tokenizer`, and loads or saves the
//! tables on disk.
//!
//! # Features
//!
//! - Builder pattern for tables, special tokens and default flags
//! - Per-call BOS / preceding-space overrides
//! - Parallel batch encoding with rayon
//! - Loading and saving as `tokenizer.json` or the packaged base64 blobs
//!
//! # Example
//!
//! ```rust
//! use llamatok_tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::builder()
//!     .vocab(["<unk>", "<s>", "</s>", "\u{2581}", "h", "i", "hi", "\u{2581}hi"])
//!     .merges([(4, 5), (3, 6)])
//!     .build()?;
//!
//! let encoding = tokenizer.encode("hi");
//! assert_eq!(encoding.ids, vec![1, 7]);
//! assert_eq!(tokenizer.decode(&encoding.ids)?, "hi");
//! # Ok::<(), llamatok_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use llamatok_core::{MergeRules, Pair, Result, SpecialTokensConfig, TokenizerError, Vocabulary};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{EncodeOptions, Encoding, Tokenizer, TokenizerBuilder, TokenizerConfig};

// IO/Serialization
pub mod io;
pub use io::{ModelFormat, PackagedFormat, SerializedTokenizer, TokenizerLoader, TokenizerSaver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
