//! Decode command implementation.

use super::{read_input, TokenizerArgs};
use anyhow::{Context, Result};
use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Token IDs to decode, separated by commas or whitespace ("-" reads stdin)
    #[arg(short, long)]
    pub ids: String,
}

fn parse_ids(input: &str) -> Result<Vec<u32>> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("Invalid token ID: {:?}", s))
        })
        .collect()
}

pub fn run(cmd: DecodeCommand) -> Result<()> {
    let tokenizer = cmd.tokenizer.load()?;
    let ids = parse_ids(&read_input(cmd.ids)?)?;

    let text = tokenizer.decode_with(&ids, cmd.tokenizer.options())?;
    println!("{}", text);

    Ok(())
}
