//! Encoding pipeline for LLaMA-style BPE.
//!
//! - Segmentation: text to one token per character, with byte fallback
//! - Detokenization: token IDs back to text
//! - `LlamaEncoder`: segmentation + merge engine, and its inverse

pub mod detokenizer;
pub mod llama;
pub mod segmenter;

pub use detokenizer::Detokenizer;
pub use llama::LlamaEncoder;
pub use segmenter::Segmenter;
