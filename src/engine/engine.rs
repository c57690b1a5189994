use std::time::Instant;

use tracing::{debug, info_span};

use crate::{
    config::EngineConfig,
    error::Result,
    model::{CausalModel, TextTokenizer},
    types::ProcessingOutput,
};

/// Loaded tokenizer and model, ready for one-shot generation
pub struct Engine<T, M> {
    config: EngineConfig,
    tokenizer: T,
    model: M,
}

#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub model_id: String,
    pub revision: String,
    pub max_length: usize,
    pub do_sample: bool,
}

impl<T: TextTokenizer, M: CausalModel> Engine<T, M> {
    pub(crate) fn new(config: EngineConfig, tokenizer: T, model: M) -> Self {
        Self {
            config,
            tokenizer,
            model,
        }
    }

    /// Encode `prompt`, generate a continuation and decode the full sequence
    /// with special tokens stripped.
    pub fn generate(&mut self, prompt: &str) -> Result<ProcessingOutput> {
        let _span = info_span!("generate").entered();
        let start_time = Instant::now();

        let encoding = self.tokenizer.encode(prompt)?;
        let prompt_tokens = encoding.len();
        let tokens = self.model.generate(&encoding, &self.config.generation)?;
        let text = self.tokenizer.decode(&tokens, true)?;
        debug!(prompt_tokens, total_tokens = tokens.len(), "Sequence decoded");

        Ok(ProcessingOutput {
            text,
            tokens,
            prompt_tokens,
            processing_time: start_time.elapsed(),
        })
    }

    /// Generate for the configured prompt
    pub fn run(&mut self) -> Result<ProcessingOutput> {
        let prompt = self.config.prompt.clone();
        self.generate(&prompt)
    }

    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            model_id: self.config.model.model_id.clone(),
            revision: self.config.model.revision.clone(),
            max_length: self.config.generation.max_length,
            do_sample: self.config.generation.do_sample,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::credential::StaticCredentials;
    use crate::testing::{self, RecordingProvider};
    use pretty_assertions::assert_eq;

    fn engine_with(
        generation: GenerationConfig,
        prompt: &str,
    ) -> Result<Engine<crate::model::LlamaTokenizer, crate::model::ModelRuntime>> {
        let config = EngineConfig {
            generation,
            prompt: prompt.to_string(),
            ..EngineConfig::default()
        };
        Ok(Engine::new(
            config,
            testing::tokenizer(),
            testing::tiny_runtime(Some(10), true)?,
        ))
    }

    #[test]
    fn test_run_uses_configured_prompt() -> Result<()> {
        let provider = RecordingProvider::default();
        let config = EngineConfig {
            prompt: "hola mundo".to_string(),
            ..EngineConfig::default()
        };
        let mut engine = crate::engine::EngineBuilder::new()
            .with_config(config)
            .with_credentials(StaticCredentials::new("HUGGINGFACE_TOKEN", Some("hf".to_string())))
            .build(&provider)?;

        let output = engine.run()?;
        assert_eq!(output.prompt_tokens, 3);
        assert_eq!(output.text, "hola mundo la programación");
        assert_eq!(output.generated_tokens(), testing::SCRIPTED_CONTINUATION);
        Ok(())
    }

    #[test]
    fn test_output_text_has_no_special_tokens() -> Result<()> {
        let mut engine = engine_with(GenerationConfig::default(), "la programación es como un juego")?;
        let output = engine.run()?;

        assert!(!output.text.is_empty());
        assert!(output.tokens.len() <= 200);
        assert!(output.text.starts_with("la programación es como un juego"));
        for special in ["<|begin_of_text|>", "<|end_of_text|>"] {
            assert!(!output.text.contains(special));
        }
        Ok(())
    }

    #[test]
    fn test_sampled_output_is_bounded() -> Result<()> {
        let generation = GenerationConfig {
            max_length: 16,
            ..GenerationConfig::default()
        };
        let mut engine = engine_with(generation, "hola mundo")?;
        for _ in 0..3 {
            let output = engine.run()?;
            assert!(!output.text.is_empty());
            assert!(output.tokens.len() <= 16);
        }
        Ok(())
    }

    #[test]
    fn test_greedy_runs_are_identical() -> Result<()> {
        let generation = GenerationConfig {
            max_length: 16,
            ..GenerationConfig::default()
        }
        .greedy();
        let mut engine = engine_with(generation, "hola mundo")?;
        let first = engine.run()?;
        let second = engine.run()?;
        assert_eq!(first.text.as_bytes(), second.text.as_bytes());
        assert_eq!(first.tokens, second.tokens);
        Ok(())
    }

    #[test]
    fn test_engine_info() -> Result<()> {
        let engine = engine_with(GenerationConfig::default(), "hola")?;
        let info = engine.info();
        assert_eq!(info.model_id, "meta-llama/Llama-3.2-1B");
        assert_eq!(info.revision, "main");
        assert_eq!(info.max_length, 200);
        assert!(info.do_sample);
        Ok(())
    }
}
