//! Model module providing tokenizer, weights loading and generation

mod loader;
mod runtime;
mod tokenizer;

pub use loader::HubLoader;
pub use runtime::{ModelRuntime, RuntimeStats};
pub use tokenizer::LlamaTokenizer;

use crate::{
    config::{GenerationConfig, ModelConfig},
    credential::Credential,
    error::Result,
    types::InputEncoding,
};

/// Token names that end a Llama sequence, newest vocabularies first
pub(crate) const EOS_TOKENS: &[&str] = &["<|end_of_text|>", "<|eot_id|>", "</s>"];

/// Maps text to token ids and back
pub trait TextTokenizer {
    /// Encode `text`, adding the model's special tokens
    fn encode(&self, text: &str) -> Result<InputEncoding>;

    fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String>;

    /// Id of the first end-of-sequence token the vocabulary knows about
    fn eos_token_id(&self) -> Option<u32>;
}

/// An autoregressive language model
pub trait CausalModel {
    /// Returns the whole sequence, `input` included, capped at `config.max_length` tokens.
    fn generate(&mut self, input: &InputEncoding, config: &GenerationConfig) -> Result<Vec<u32>>;
}

/// Source of pretrained artifacts. Network, caching and deserialization are its business.
pub trait ModelProvider {
    type Tokenizer: TextTokenizer;
    type Model: CausalModel;

    fn load_tokenizer(&self, model: &ModelConfig, credential: &Credential) -> Result<Self::Tokenizer>;

    /// `eos_fallback` is used when the model config does not name an end token
    fn load_model(
        &self,
        model: &ModelConfig,
        credential: &Credential,
        eos_fallback: Option<u32>,
    ) -> Result<Self::Model>;
}
