//! Initial segmentation: text to one token per character.
//!
//! Spaces become the space glyph before anything else, so runs of spaces are
//! plain runs of a repeated character for the merge engine. Characters
//! without a token of their own fall back to one byte-level token per UTF-8
//! byte.

use crate::core::vocab::Vocabulary;
use tracing::warn;

/// Maps text to the initial token sequence fed to the merge engine.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> Segmenter<'a> {
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Segment `text` into initial token IDs.
    ///
    /// Empty text yields no tokens, even when `add_bos_token` is set.
    pub fn segment(&self, text: &str, add_bos_token: bool, add_preceding_space: bool) -> Vec<u32> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut prompt = String::with_capacity(text.len() + 1);
        if add_preceding_space {
            prompt.push(' ');
        }
        prompt.push_str(text);
        let prompt = prompt.replace(' ', self.vocab.space_glyph());

        let mut ids = Vec::with_capacity(prompt.len() + 1);
        if add_bos_token {
            ids.push(self.vocab.special().bos);
        }

        for c in prompt.chars() {
            match self.vocab.char_id(c) {
                Some(id) => ids.push(id),
                None => self.push_bytes(c, &mut ids),
            }
        }

        ids
    }

    /// Byte fallback: one `<0xHH>` token per UTF-8 byte of `c`, in order.
    fn push_bytes(&self, c: char, ids: &mut Vec<u32>) {
        let mut buf = [0u8; 4];
        for &byte in c.encode_utf8(&mut buf).as_bytes() {
            match self.vocab.byte_id(byte) {
                Some(id) => ids.push(id),
                None => {
                    warn!(
                        character = %c.escape_unicode(),
                        byte = %format_args!("0x{:02X}", byte),
                        "no byte-level token, substituting unknown token"
                    );
                    ids.push(self.vocab.special().unk);
                }
            }
        }
    }
}
