// Location: src/model/tokenizer.rs

use std::path::Path;

use tokenizers::Tokenizer as HfTokenizer;
use tracing::debug;

use super::{TextTokenizer, EOS_TOKENS};
use crate::error::{EngineError, Result};
use crate::types::InputEncoding;

pub struct LlamaTokenizer {
    /// HuggingFace tokenizer
    tokenizer: HfTokenizer,
    /// Special token IDs
    special_tokens: SpecialTokens,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpecialTokens {
    bos_token_id: Option<u32>,
    eos_token_id: Option<u32>,
}

impl SpecialTokens {
    fn detect(tokenizer: &HfTokenizer) -> Self {
        let bos_token_id = ["<|begin_of_text|>", "<s>"]
            .iter()
            .find_map(|t| tokenizer.token_to_id(t));
        let eos_token_id = EOS_TOKENS.iter().find_map(|t| tokenizer.token_to_id(t));
        Self {
            bos_token_id,
            eos_token_id,
        }
    }
}

impl LlamaTokenizer {
    /// Load a `tokenizer.json`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = HfTokenizer::from_file(path)?;
        debug!(path = %path.display(), "Tokenizer loaded");
        Ok(Self::from_tokenizer(tokenizer))
    }

    /// Parse a serialized `tokenizer.json` held in memory
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self> {
        Ok(Self::from_tokenizer(HfTokenizer::from_bytes(bytes)?))
    }

    pub fn from_tokenizer(tokenizer: HfTokenizer) -> Self {
        let special_tokens = SpecialTokens::detect(&tokenizer);
        Self {
            tokenizer,
            special_tokens,
        }
    }

    /// Get token ID for a string
    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.tokenizer.token_to_id(token)
    }

    /// Get string for a token ID
    pub fn id_to_token(&self, id: u32) -> Option<String> {
        self.tokenizer.id_to_token(id)
    }

    pub fn bos_token_id(&self) -> Option<u32> {
        self.special_tokens.bos_token_id
    }

    /// Get the vocabulary size, added tokens included
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }
}

impl TextTokenizer for LlamaTokenizer {
    fn encode(&self, text: &str) -> Result<InputEncoding> {
        let encoding = self.tokenizer.encode(text, true)?;
        let ids = encoding.get_ids().to_vec();
        if ids.is_empty() {
            return Err(EngineError::ProcessingError {
                message: "Tokenization produced no tokens".to_string(),
                source: None,
            });
        }
        debug!(tokens = ids.len(), "Prompt encoded");
        Ok(InputEncoding::new(ids))
    }

    fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        Ok(self.tokenizer.decode(ids, skip_special_tokens)?)
    }

    fn eos_token_id(&self) -> Option<u32> {
        self.special_tokens.eos_token_id
    }
}
