//! CLI commands for the llamatok tokenizer.

pub mod benchmark;
pub mod decode;
pub mod encode;
pub mod tokens;

pub use benchmark::BenchmarkCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use tokens::TokensCommand;

use anyhow::{Context, Result};
use clap::Args;
use llamatok_tokenizer::{EncodeOptions, Tokenizer};
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

/// Arguments shared by every command that loads a tokenizer.
#[derive(Args)]
pub struct TokenizerArgs {
    /// Directory holding tokenizer.json or vocab_base64.txt + merges_binary.txt
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Do not prepend the begin-of-text token
    #[arg(long, default_value_t = false)]
    pub no_bos: bool,

    /// Do not prepend a space to the text
    #[arg(long, default_value_t = false)]
    pub no_preceding_space: bool,
}

impl TokenizerArgs {
    pub fn load(&self) -> Result<Tokenizer> {
        let tokenizer = Tokenizer::load(&self.tokenizer).with_context(|| {
            format!("Failed to load tokenizer from {}", self.tokenizer.display())
        })?;

        info!(
            path = %self.tokenizer.display(),
            vocab_size = tokenizer.vocab_size(),
            add_bos_token = !self.no_bos,
            add_preceding_space = !self.no_preceding_space,
            "tokenizer ready"
        );
        Ok(tokenizer)
    }

    pub fn options(&self) -> EncodeOptions {
        EncodeOptions {
            add_bos_token: !self.no_bos,
            add_preceding_space: !self.no_preceding_space,
        }
    }
}

/// Read the input argument, or stdin if it is "-".
pub fn read_input(input: String) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dir: PathBuf) -> TokenizerArgs {
        TokenizerArgs {
            tokenizer: dir,
            no_bos: false,
            no_preceding_space: true,
        }
    }

    #[test]
    fn test_load_saved_tokenizer() {
        let dir = std::env::temp_dir().join("llamatok_cli_test_load");
        std::fs::remove_dir_all(&dir).ok();

        let tokenizer = Tokenizer::builder()
            .vocab(["<unk>", "<s>", "</s>", "\u{2581}", "h", "i", "hi"])
            .merges([(4, 5)])
            .build()
            .unwrap();
        tokenizer.save(&dir).unwrap();

        let args = args(dir.clone());
        let loaded = args.load().unwrap();
        assert_eq!(loaded.vocab_size(), 7);
        assert_eq!(loaded.encode_with("hi", args.options()).ids, vec![1, 6]);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = std::env::temp_dir().join("llamatok_cli_test_missing");
        std::fs::remove_dir_all(&dir).ok();

        let err = args(dir).load().unwrap_err();
        assert!(err.to_string().contains("Failed to load tokenizer"));
    }

    #[test]
    fn test_options_from_flags() {
        let options = args(PathBuf::new()).options();
        assert!(options.add_bos_token);
        assert!(!options.add_preceding_space);
    }
}
