use tracing::{info, info_span};

use crate::{
    config::EngineConfig,
    credential::{CredentialSource, EnvCredentials},
    error::Result,
    model::{ModelProvider, TextTokenizer},
};

use super::engine::Engine;

/// Builder for constructing an [`Engine`]
pub struct EngineBuilder {
    config: EngineConfig,
    credentials: Option<Box<dyn CredentialSource>>,
}

impl EngineBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            credentials: None,
        }
    }

    /// Set the engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the environment lookup of the credential
    pub fn with_credentials(mut self, source: impl CredentialSource + 'static) -> Self {
        self.credentials = Some(Box::new(source));
        self
    }

    /// Resolve the credential, then load tokenizer and model through `provider`.
    /// A missing credential fails here before the provider is touched.
    pub fn build<P: ModelProvider>(self, provider: &P) -> Result<Engine<P::Tokenizer, P::Model>> {
        self.config.validate()?;

        let credentials: Box<dyn CredentialSource> = match self.credentials {
            Some(source) => source,
            None => Box::new(EnvCredentials::new(self.config.model.credential_var.clone())),
        };
        let credential = credentials.resolve()?;
        info!(variable = %self.config.model.credential_var, "Credential resolved");

        let _span = info_span!("load", model = %self.config.model.model_id).entered();
        let tokenizer = provider.load_tokenizer(&self.config.model, &credential)?;
        let model = provider.load_model(&self.config.model, &credential, tokenizer.eos_token_id())?;
        info!("Tokenizer and model ready");

        Ok(Engine::new(self.config, tokenizer, model))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
