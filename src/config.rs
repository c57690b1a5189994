// Location: src/config.rs

use candle_transformers::generation::Sampling;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Hub repository of the pretrained model
pub const MODEL_ID: &str = "meta-llama/Llama-3.2-1B";

/// Environment variable holding the Hugging Face access token
pub const CREDENTIAL_VAR: &str = "HUGGINGFACE_TOKEN";

/// Any non-empty value forces inference on the CPU
pub const FORCE_CPU_VAR: &str = "LLAMA_POC_CPU";

pub const DEFAULT_PROMPT: &str = "Por favor responde en español Explícale en español a un niño de 5 años qué es la programación. Usa un lenguaje sencillo y da ejemplos fáciles de entender.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub model: ModelConfig,
    pub generation: GenerationConfig,
    pub monitoring: MonitoringConfig,
    /// Text fed to the model
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Hub model identifier (e.g., "meta-llama/Llama-3.2-1B")
    pub model_id: String,

    /// Git revision of the hub repository
    pub revision: String,

    /// Name of the environment variable carrying the credential
    pub credential_var: String,

    /// Run on CPU even when a GPU is available
    pub force_cpu: bool,

    /// Whether to use flash attention
    pub use_flash_attn: bool,

    /// Keep a key/value cache between decoding steps
    pub use_kv_cache: bool,
}

/// Decoding hyperparameters. Built once, never mutated during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on the full sequence length, prompt included
    pub max_length: usize,

    /// Sample from the distribution instead of taking the argmax
    pub do_sample: bool,

    /// Temperature for sampling
    pub temperature: f64,

    /// Penalty applied to logits of tokens already in the sequence, 1.0 disables it
    pub repetition_penalty: f32,

    /// Top-k sampling
    pub top_k: Option<usize>,

    /// Top-p sampling threshold
    pub top_p: Option<f64>,

    /// Sampling seed; a random one is drawn when unset
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Log level
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            generation: GenerationConfig::default(),
            monitoring: MonitoringConfig {
                log_level: LogLevel::Info,
            },
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: MODEL_ID.to_string(),
            revision: "main".to_string(),
            credential_var: CREDENTIAL_VAR.to_string(),
            force_cpu: false,
            use_flash_attn: false,
            use_kv_cache: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: 200,
            do_sample: true,
            temperature: 0.7,
            repetition_penalty: 1.2,
            top_k: Some(50),
            top_p: Some(0.9),
            seed: None,
        }
    }
}

impl GenerationConfig {
    /// Greedy decoding with the same limits, useful for reproducible runs
    pub fn greedy(&self) -> Self {
        Self {
            do_sample: false,
            ..self.clone()
        }
    }

    /// Sampling strategy handed to candle's logits processor
    pub fn sampling(&self) -> Sampling {
        if !self.do_sample || self.temperature <= 0.0 {
            return Sampling::ArgMax;
        }
        let temperature = self.temperature;
        match (self.top_k, self.top_p) {
            (None, None) => Sampling::All { temperature },
            (Some(k), None) => Sampling::TopK { k, temperature },
            (None, Some(p)) => Sampling::TopP { p, temperature },
            (Some(k), Some(p)) => Sampling::TopKThenTopP { k, p, temperature },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(EngineError::configuration(
                "max_length",
                "Maximum length must be greater than 0",
            ));
        }

        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(EngineError::configuration(
                "temperature",
                "Temperature must be a non-negative number",
            ));
        }

        if !self.repetition_penalty.is_finite() || self.repetition_penalty <= 0.0 {
            return Err(EngineError::configuration(
                "repetition_penalty",
                "Repetition penalty must be strictly positive",
            ));
        }

        if self.top_k == Some(0) {
            return Err(EngineError::configuration(
                "top_k",
                "Top-k must be greater than 0 when specified",
            ));
        }

        if let Some(p) = self.top_p {
            if !(p > 0.0 && p <= 1.0) {
                return Err(EngineError::configuration(
                    "top_p",
                    "Top-p must be in (0, 1]",
                ));
            }
        }

        Ok(())
    }
}

impl EngineConfig {
    /// Default configuration with the optional environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.model.force_cpu = std::env::var(FORCE_CPU_VAR)
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.model_id.is_empty() {
            return Err(EngineError::configuration(
                "model_id",
                "Model identifier cannot be empty",
            ));
        }

        if self.model.credential_var.is_empty() {
            return Err(EngineError::configuration(
                "credential_var",
                "Credential variable name cannot be empty",
            ));
        }

        if self.prompt.is_empty() {
            return Err(EngineError::configuration("prompt", "Prompt cannot be empty"));
        }

        self.generation.validate()
    }
}
