//! Benchmark command implementation.

use super::TokenizerArgs;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::hint::black_box;
use std::time::Instant;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Path to input text file for benchmarking
    #[arg(short, long)]
    pub input: String,

    /// Number of iterations to run
    #[arg(short = 'n', long, default_value_t = 100)]
    pub iterations: usize,
}

pub fn run(cmd: BenchmarkCommand) -> Result<()> {
    let tokenizer = cmd.tokenizer.load()?;
    let options = cmd.tokenizer.options();

    let text = fs::read_to_string(&cmd.input)
        .with_context(|| format!("Failed to read {}", cmd.input))?;
    let iterations = cmd.iterations.max(1);

    println!("Benchmarking encoding...");
    println!("  Text length: {} bytes", text.len());
    println!("  Iterations: {}", iterations);
    println!();

    // Warmup
    let tokens = tokenizer.encode_with(&text, options).len();

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(tokenizer.encode_with(black_box(&text), options));
    }
    let elapsed = start.elapsed();

    let avg_secs = elapsed.as_secs_f64() / iterations as f64;

    println!("Results:");
    println!("  Tokens per encode: {}", tokens);
    println!("  Total time: {:.2}s", elapsed.as_secs_f64());
    println!("  Average time: {:.3}ms", avg_secs * 1000.0);
    if avg_secs > 0.0 {
        println!("  Throughput: {:.0} tokens/s", tokens as f64 / avg_secs);
        println!(
            "  Throughput: {:.2} MB/s",
            text.len() as f64 / avg_secs / 1_000_000.0
        );
    }

    Ok(())
}
