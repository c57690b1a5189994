//! llama-poc - one-shot Llama 3.2 text generation
//!
//! Loads `meta-llama/Llama-3.2-1B` and its tokenizer from the Hugging Face Hub,
//! authenticated with the `HUGGINGFACE_TOKEN` environment variable, samples a
//! continuation of a fixed prompt and returns the decoded text.

use std::fmt;

// Public modules
pub mod config;
pub mod credential;
pub mod engine;
pub mod error;
pub mod model;
pub mod types;
pub mod utils;

// Internal modules
mod gpu;

#[cfg(test)]
mod testing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-exports for public API
pub use config::{EngineConfig, GenerationConfig, ModelConfig};
pub use credential::{Credential, CredentialSource, EnvCredentials, StaticCredentials};
pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, ErrorExt, Result};
pub use gpu::{default_dtype, select_device};
pub use model::{CausalModel, HubLoader, ModelProvider, TextTokenizer};
pub use types::{InputEncoding, ProcessingOutput};

/// Feature detection for supported backends
pub struct Features {
    /// Whether CUDA support is enabled
    pub cuda: bool,
}

impl Features {
    /// Detect available features at runtime
    pub fn detect() -> Self {
        Self {
            cuda: candle_core::utils::cuda_is_available(),
        }
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CUDA support: {}", if self.cuda { "yes" } else { "no" })
    }
}
