//! Test doubles: an in-memory tokenizer, a tiny zero-weight Llama and a provider
//! that records what it was asked to load.

use std::cell::{Cell, RefCell};

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::llama::{Llama, LlamaConfig};

use crate::{
    config::{GenerationConfig, ModelConfig},
    credential::Credential,
    error::{EngineError, Result},
    model::{CausalModel, LlamaTokenizer, ModelProvider, ModelRuntime},
    types::InputEncoding,
};

pub const VOCAB_SIZE: usize = 11;
pub const MAX_POSITION_EMBEDDINGS: usize = 32;

/// "la programación" followed by the end-of-text token
pub const SCRIPTED_CONTINUATION: &[u32] = &[3, 4, 10];

/// WordLevel vocabulary with Llama 3 style BOS/EOS added tokens and a BOS template.
const TOKENIZER_JSON: &str = r#"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [
    {"id": 9, "content": "<|begin_of_text|>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
    {"id": 10, "content": "<|end_of_text|>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
  ],
  "normalizer": null,
  "pre_tokenizer": {"type": "Whitespace"},
  "post_processor": {
    "type": "TemplateProcessing",
    "single": [
      {"SpecialToken": {"id": "<|begin_of_text|>", "type_id": 0}},
      {"Sequence": {"id": "A", "type_id": 0}}
    ],
    "pair": [
      {"SpecialToken": {"id": "<|begin_of_text|>", "type_id": 0}},
      {"Sequence": {"id": "A", "type_id": 0}},
      {"Sequence": {"id": "B", "type_id": 1}}
    ],
    "special_tokens": {
      "<|begin_of_text|>": {"id": "<|begin_of_text|>", "ids": [9], "tokens": ["<|begin_of_text|>"]}
    }
  },
  "decoder": null,
  "model": {
    "type": "WordLevel",
    "vocab": {
      "[UNK]": 0, "hola": 1, "mundo": 2, "la": 3, "programación": 4,
      "es": 5, "como": 6, "un": 7, "juego": 8
    },
    "unk_token": "[UNK]"
  }
}"#;

pub fn tokenizer() -> LlamaTokenizer {
    LlamaTokenizer::from_bytes(TOKENIZER_JSON).expect("test tokenizer json parses")
}

fn tiny_config(eos_token_id: Option<u32>) -> Result<LlamaConfig> {
    let mut json = serde_json::json!({
        "hidden_size": 8,
        "intermediate_size": 16,
        "vocab_size": VOCAB_SIZE,
        "num_hidden_layers": 1,
        "num_attention_heads": 2,
        "num_key_value_heads": 2,
        "rms_norm_eps": 1e-5,
        "rope_theta": 10000.0,
        "max_position_embeddings": MAX_POSITION_EMBEDDINGS,
        "bos_token_id": 9,
        "tie_word_embeddings": false
    });
    if let Some(eos) = eos_token_id {
        json["eos_token_id"] = eos.into();
    }
    Ok(serde_json::from_value(json)?)
}

/// Llama with every weight set to zero: uniform logits, deterministic on the CPU.
pub fn tiny_runtime(eos_token_id: Option<u32>, use_kv_cache: bool) -> Result<ModelRuntime> {
    let device = Device::Cpu;
    let config = tiny_config(eos_token_id)?.into_config(false);
    let vb = VarBuilder::zeros(DType::F32, &device);
    let model = Llama::load(vb, &config)?;
    Ok(ModelRuntime::new(
        model,
        config,
        device,
        DType::F32,
        use_kv_cache,
        None,
    ))
}

/// Appends [`SCRIPTED_CONTINUATION`] to the prompt, within `max_length`.
pub struct ScriptedModel;

impl CausalModel for ScriptedModel {
    fn generate(&mut self, input: &InputEncoding, config: &GenerationConfig) -> Result<Vec<u32>> {
        let mut tokens = input.ids().to_vec();
        for &token in SCRIPTED_CONTINUATION {
            if tokens.len() >= config.max_length {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }
}

#[derive(Default)]
pub struct RecordingProvider {
    calls: RefCell<Vec<(String, String)>>,
    eos_fallback: Cell<Option<u32>>,
    failure: Option<String>,
}

impl RecordingProvider {
    /// Every load fails with `message`, as a rejected token would
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// `(artifact, credential)` per load call, in order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }

    pub fn eos_fallback(&self) -> Option<u32> {
        self.eos_fallback.get()
    }

    fn record(&self, artifact: &str, credential: &Credential) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((artifact.to_string(), credential.expose().to_string()));
        match &self.failure {
            Some(message) => Err(EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                message.clone(),
            ))),
            None => Ok(()),
        }
    }
}

impl ModelProvider for RecordingProvider {
    type Tokenizer = LlamaTokenizer;
    type Model = ScriptedModel;

    fn load_tokenizer(&self, _model: &ModelConfig, credential: &Credential) -> Result<LlamaTokenizer> {
        self.record("tokenizer", credential)?;
        Ok(tokenizer())
    }

    fn load_model(
        &self,
        _model: &ModelConfig,
        credential: &Credential,
        eos_fallback: Option<u32>,
    ) -> Result<ScriptedModel> {
        self.record("model", credential)?;
        self.eos_fallback.set(eos_fallback);
        Ok(ScriptedModel)
    }
}
