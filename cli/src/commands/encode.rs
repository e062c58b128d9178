//! Encode command implementation.

use super::{read_input, TokenizerArgs};
use anyhow::Result;
use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

pub fn run(cmd: EncodeCommand) -> Result<()> {
    let tokenizer = cmd.tokenizer.load()?;
    let text = read_input(cmd.input)?;

    let encoding = tokenizer.encode_with(&text, cmd.tokenizer.options());

    let ids_str: Vec<String> = encoding.ids.iter().map(|id| id.to_string()).collect();
    let output = ids_str.join(" ");

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded {} tokens to {}", encoding.len(), path);
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
