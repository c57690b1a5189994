//! Common type definitions used throughout the engine

use std::time::Duration;

use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Token ids of an encoded prompt, special tokens included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEncoding {
    ids: Vec<u32>,
}

impl InputEncoding {
    pub fn new(ids: Vec<u32>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `(1, seq_len)` u32 tensor on `device`, the shape the Llama forward pass expects
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::new(self.ids.as_slice(), device)?.unsqueeze(0)?)
    }

    pub fn into_ids(self) -> Vec<u32> {
        self.ids
    }
}

/// Result of one generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutput {
    /// Decoded text, special tokens stripped
    pub text: String,
    /// Full output sequence: prompt followed by the generated tokens
    pub tokens: Vec<u32>,
    /// Number of leading prompt tokens in `tokens`
    pub prompt_tokens: usize,
    /// Time taken to process
    pub processing_time: Duration,
}

impl ProcessingOutput {
    pub fn generated_tokens(&self) -> &[u32] {
        &self.tokens[self.prompt_tokens.min(self.tokens.len())..]
    }
}
