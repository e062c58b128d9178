//! Serialization and deserialization of tokenizer tables.
//!
//! This module provides loading and saving of the vocabulary and merge table,
//! either as a single JSON file or in the packaged base64 format.

pub mod format;
pub mod load;
pub mod save;

pub use format::{ModelFormat, PackagedFormat, SerializedTokenizer};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;
