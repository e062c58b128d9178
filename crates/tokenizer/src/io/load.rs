//! Load functionality for pre-trained tokenizer tables.
//!
//! Loading only decodes the tables into plain arrays; building and validating
//! the vocabulary and merge table is left to `TokenizerBuilder`.

use super::format::{
    ModelFormat, PackagedFormat, SerializedTokenizer, MERGES_BINARY, TOKENIZER_JSON, VOCAB_BASE64,
};
use llamatok_core::{Result, SpecialTokensConfig, TokenizerError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Tokenizer loader - decodes tables from disk.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load tables from a directory, detecting the format.
    pub fn load(path: &Path) -> Result<SerializedTokenizer> {
        match ModelFormat::detect(path) {
            Some(ModelFormat::Json) => Self::load_json(path),
            Some(ModelFormat::Packaged) => Self::load_packaged(path),
            None => Err(TokenizerError::Load(format!(
                "{} contains neither {} nor {} + {}",
                path.display(),
                TOKENIZER_JSON,
                VOCAB_BASE64,
                MERGES_BINARY
            ))),
        }
    }

    /// Load tables from `tokenizer.json` in the given directory.
    pub fn load_json(path: &Path) -> Result<SerializedTokenizer> {
        let file_path = path.join(TOKENIZER_JSON);
        let file = File::open(&file_path).map_err(|err| TokenizerError::Io {
            path: file_path.clone(),
            err,
        })?;

        let serialized: SerializedTokenizer = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                TokenizerError::Load(format!(
                    "Failed to deserialize {}: {}",
                    file_path.display(),
                    e
                ))
            })?;

        info!(
            path = %file_path.display(),
            vocab = serialized.vocab.len(),
            merges = serialized.merges.len(),
            "loaded tokenizer tables"
        );
        Ok(serialized)
    }

    /// Load tables from `vocab_base64.txt` and `merges_binary.txt`.
    pub fn load_packaged(path: &Path) -> Result<SerializedTokenizer> {
        let read = |name: &str| {
            let file_path = path.join(name);
            std::fs::read_to_string(&file_path).map_err(|err| TokenizerError::Io {
                path: file_path,
                err,
            })
        };

        let serialized = Self::from_packaged(&read(VOCAB_BASE64)?, &read(MERGES_BINARY)?)?;

        info!(
            path = %path.display(),
            vocab = serialized.vocab.len(),
            merges = serialized.merges.len(),
            "loaded packaged tokenizer tables"
        );
        Ok(serialized)
    }

    /// Decode tables from the packaged base64 strings.
    ///
    /// Special tokens take their LLaMA defaults.
    pub fn from_packaged(vocab_base64: &str, merges_binary: &str) -> Result<SerializedTokenizer> {
        Ok(SerializedTokenizer {
            version: super::format::FORMAT_VERSION.to_string(),
            special_tokens: SpecialTokensConfig::default(),
            vocab: PackagedFormat::decode_vocab(vocab_base64)?,
            merges: PackagedFormat::decode_merges(merges_binary)?,
        })
    }
}
