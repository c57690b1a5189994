use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use candle_core::DType;
use candle_nn::VarBuilder;
use candle_transformers::models::llama::{Llama, LlamaConfig};
use hf_hub::api::sync::{Api, ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};
use tracing::{debug, info};

use super::{LlamaTokenizer, ModelProvider, ModelRuntime};
use crate::{
    config::ModelConfig,
    credential::Credential,
    error::{EngineError, Result},
    gpu,
};

const TOKENIZER_FILE: &str = "tokenizer.json";
const CONFIG_FILE: &str = "config.json";
const SINGLE_WEIGHTS_FILE: &str = "model.safetensors";
const WEIGHTS_INDEX_FILE: &str = "model.safetensors.index.json";

/// Fetches tokenizer and weights from the Hugging Face Hub through `hf-hub`'s
/// blocking client, which also owns the local cache. The compute device is only
/// chosen once weights are about to be loaded.
pub struct HubLoader {
    dtype: Option<DType>,
    progress: bool,
    api: OnceCell<Api>,
}

impl HubLoader {
    pub fn new() -> Self {
        Self {
            dtype: None,
            progress: true,
            api: OnceCell::new(),
        }
    }

    /// Override the per-device default weights dtype
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    /// Show download progress bars on stderr
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Client authenticated with the first credential it is asked for, then reused.
    fn api(&self, credential: &Credential) -> Result<&Api> {
        if let Some(api) = self.api.get() {
            return Ok(api);
        }
        let api = ApiBuilder::new()
            .with_token(Some(credential.expose().to_string()))
            .with_progress(self.progress)
            .build()?;
        Ok(self.api.get_or_init(|| api))
    }

    fn repo(&self, model: &ModelConfig, credential: &Credential) -> Result<ApiRepo> {
        let api = self.api(credential)?;
        Ok(api.repo(Repo::with_revision(
            model.model_id.clone(),
            RepoType::Model,
            model.revision.clone(),
        )))
    }

    /// Single-file checkpoints are tried first; sharded ones ship an index instead.
    fn weight_files(repo: &ApiRepo) -> Result<Vec<PathBuf>> {
        match repo.get(SINGLE_WEIGHTS_FILE) {
            Ok(path) => Ok(vec![path]),
            Err(single_err) => {
                debug!(error = %single_err, "No single weights file, looking for a shard index");
                let index = repo.get(WEIGHTS_INDEX_FILE).map_err(|_| single_err)?;
                shard_names(&index)?
                    .iter()
                    .map(|shard| Ok(repo.get(shard)?))
                    .collect()
            }
        }
    }
}

impl Default for HubLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelProvider for HubLoader {
    type Tokenizer = LlamaTokenizer;
    type Model = ModelRuntime;

    fn load_tokenizer(&self, model: &ModelConfig, credential: &Credential) -> Result<LlamaTokenizer> {
        let repo = self.repo(model, credential)?;
        let path = repo.get(TOKENIZER_FILE)?;
        info!(model = %model.model_id, "Tokenizer fetched");
        LlamaTokenizer::from_file(path)
    }

    fn load_model(
        &self,
        model: &ModelConfig,
        credential: &Credential,
        eos_fallback: Option<u32>,
    ) -> Result<ModelRuntime> {
        let repo = self.repo(model, credential)?;

        let config_path = repo.get(CONFIG_FILE)?;
        let llama_config: LlamaConfig = serde_json::from_slice(&std::fs::read(config_path)?)?;
        let config = llama_config.into_config(model.use_flash_attn);

        let filenames = Self::weight_files(&repo)?;

        let device = gpu::select_device(model.force_cpu)?;
        let dtype = self.dtype.unwrap_or_else(|| gpu::default_dtype(&device));
        info!(
            model = %model.model_id,
            files = filenames.len(),
            dtype = ?dtype,
            "Loading model weights"
        );

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&filenames, dtype, &device)? };
        let llama = Llama::load(vb, &config).map_err(|e| EngineError::InitializationError {
            message: format!("Failed to build {} from its weights", model.model_id),
            source: Some(Box::new(e)),
        })?;

        Ok(ModelRuntime::new(
            llama,
            config,
            device,
            dtype,
            model.use_kv_cache,
            eos_fallback,
        ))
    }
}

/// Distinct shard file names listed in a `model.safetensors.index.json`, sorted
pub(crate) fn shard_names(index_path: &Path) -> Result<Vec<String>> {
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(index_path)?)?;
    let weight_map = json
        .get("weight_map")
        .and_then(|m| m.as_object())
        .ok_or_else(|| EngineError::InitializationError {
            message: format!("No weight_map in {}", index_path.display()),
            source: None,
        })?;

    let shards: BTreeSet<String> = weight_map
        .values()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    Ok(shards.into_iter().collect())
}
