//! Tokens command: print the token strings for a piece of text.

use super::{read_input, TokenizerArgs};
use anyhow::Result;
use clap::Parser;

/// Tokens command arguments.
#[derive(Parser)]
pub struct TokensCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Text to tokenize ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,
}

pub fn run(cmd: TokensCommand) -> Result<()> {
    let tokenizer = cmd.tokenizer.load()?;
    let text = read_input(cmd.input)?;

    let encoding = tokenizer.encode_with(&text, cmd.tokenizer.options());
    let tokens = tokenizer.tokens(&encoding.ids)?;

    for (id, token) in encoding.ids.iter().zip(tokens) {
        println!("{:>6}  {:?}", id, token);
    }

    Ok(())
}
