//! Save functionality for tokenizer tables.

use super::format::{
    PackagedFormat, SerializedTokenizer, FORMAT_VERSION, MERGES_BINARY, TOKENIZER_JSON,
    VOCAB_BASE64,
};
use llamatok_core::{MergeRules, Result, SpecialTokensConfig, TokenizerError, Vocabulary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Tokenizer saver - writes tables to disk.
pub struct TokenizerSaver<'a> {
    /// Vocabulary reference
    vocab: &'a Vocabulary,
    /// Merge rules reference
    merges: &'a MergeRules,
    /// Special token strings
    special_tokens: &'a SpecialTokensConfig,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(
        vocab: &'a Vocabulary,
        merges: &'a MergeRules,
        special_tokens: &'a SpecialTokensConfig,
    ) -> Self {
        Self {
            vocab,
            merges,
            special_tokens,
        }
    }

    /// Build the serializable form of the tables.
    pub fn serialize(&self) -> SerializedTokenizer {
        SerializedTokenizer {
            version: FORMAT_VERSION.to_string(),
            special_tokens: self.special_tokens.clone(),
            vocab: self.vocab.iter().map(|(_, token)| token.to_string()).collect(),
            merges: self.merges.ordered_pairs(),
        }
    }

    /// Save the tables to `tokenizer.json` in the given directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        create_dir(path)?;

        let file_path = path.join(TOKENIZER_JSON);
        let file = File::create(&file_path).map_err(|err| TokenizerError::Io {
            path: file_path.clone(),
            err,
        })?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, &self.serialize())?;
        writer.flush().map_err(|err| TokenizerError::Io {
            path: file_path.clone(),
            err,
        })?;

        info!(path = %file_path.display(), "saved tokenizer tables");
        Ok(())
    }

    /// Save the tables as `vocab_base64.txt` and `merges_binary.txt`.
    ///
    /// Special token strings are not part of the packaged format.
    pub fn save_packaged(&self, path: &Path) -> Result<()> {
        create_dir(path)?;

        let vocab_blob = PackagedFormat::encode_vocab(self.vocab)?;
        let merges_blob = PackagedFormat::encode_merges(&self.merges.ordered_pairs())?;

        for (name, blob) in [(VOCAB_BASE64, vocab_blob), (MERGES_BINARY, merges_blob)] {
            let file_path = path.join(name);
            std::fs::write(&file_path, blob).map_err(|err| TokenizerError::Io {
                path: file_path,
                err,
            })?;
        }

        info!(path = %path.display(), "saved packaged tokenizer tables");
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| {
        TokenizerError::Save(format!(
            "Failed to create directory {}: {}",
            path.display(),
            e
        ))
    })
}
