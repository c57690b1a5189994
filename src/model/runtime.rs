// Location: src/model/runtime.rs

use std::time::{Duration, Instant};

use candle_core::{DType, Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::llama::{Cache, Config, Llama, LlamaEosToks};
use tracing::{debug, info, warn};

use super::CausalModel;
use crate::{config::GenerationConfig, error::Result, types::InputEncoding};

pub struct ModelRuntime {
    model: Llama,
    config: Config,
    device: Device,
    dtype: DType,
    use_kv_cache: bool,
    eos_token_id: Option<LlamaEosToks>,
    stats: RuntimeStats,
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeStats {
    pub total_processed: usize,
    pub total_tokens_generated: usize,
    pub last_processing_time: Option<Duration>,
}

impl ModelRuntime {
    /// Wrap loaded weights. `eos_fallback` applies only when `config` names no end token.
    pub fn new(
        model: Llama,
        config: Config,
        device: Device,
        dtype: DType,
        use_kv_cache: bool,
        eos_fallback: Option<u32>,
    ) -> Self {
        let eos_token_id = config
            .eos_token_id
            .clone()
            .or_else(|| eos_fallback.map(LlamaEosToks::Single));

        Self {
            model,
            config,
            device,
            dtype,
            use_kv_cache,
            eos_token_id,
            stats: RuntimeStats::default(),
        }
    }

    /// Get runtime statistics
    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    fn is_eos(&self, token: u32) -> bool {
        match &self.eos_token_id {
            Some(LlamaEosToks::Single(eos)) => *eos == token,
            Some(LlamaEosToks::Multiple(eos)) => eos.contains(&token),
            None => false,
        }
    }
}

impl CausalModel for ModelRuntime {
    fn generate(&mut self, input: &InputEncoding, config: &GenerationConfig) -> Result<Vec<u32>> {
        let start_time = Instant::now();
        let mut tokens = input.ids().to_vec();
        let prompt_len = tokens.len();

        let max_length = config.max_length.min(self.config.max_position_embeddings);
        if prompt_len >= max_length {
            warn!(
                prompt_tokens = prompt_len,
                max_length, "Prompt already reaches the maximum length, nothing generated"
            );
            return Ok(tokens);
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut logits_processor = LogitsProcessor::from_sampling(seed, config.sampling());
        let mut cache = Cache::new(self.use_kv_cache, self.dtype, &self.config, &self.device)?;
        debug!(seed, max_length, "Starting generation");

        let mut index_pos = 0;
        for step in 0..(max_length - prompt_len) {
            let (context_size, context_index) = if self.use_kv_cache && step > 0 {
                (1, index_pos)
            } else {
                (tokens.len(), 0)
            };
            let ctxt = &tokens[tokens.len() - context_size..];
            let input_tensor = if step == 0 {
                input.to_tensor(&self.device)?
            } else {
                Tensor::new(ctxt, &self.device)?.unsqueeze(0)?
            };

            let logits = self.model.forward(&input_tensor, context_index, &mut cache)?;
            let logits = logits.squeeze(0)?.to_dtype(DType::F32)?;
            let logits = if config.repetition_penalty == 1.0 {
                logits
            } else {
                candle_transformers::utils::apply_repeat_penalty(
                    &logits,
                    config.repetition_penalty,
                    &tokens,
                )?
            };
            index_pos += ctxt.len();

            let next_token = logits_processor.sample(&logits)?;
            tokens.push(next_token);

            if self.is_eos(next_token) {
                debug!(step, "End of sequence token sampled");
                break;
            }
        }

        let generated = tokens.len() - prompt_len;
        let processing_time = start_time.elapsed();
        self.stats.total_processed += 1;
        self.stats.total_tokens_generated += generated;
        self.stats.last_processing_time = Some(processing_time);

        info!(
            tokens = generated,
            time_ms = processing_time.as_millis() as u64,
            tokens_per_sec = generated as f64 / processing_time.as_secs_f64().max(f64::EPSILON),
            "Generation complete"
        );

        Ok(tokens)
    }
}
