// src/services/local_llm.rs
//
// In-process text generation over quantized GGUF weights.
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use candle_core::quantized::gguf_file;
use candle_core::{Device, Tensor};
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::quantized_llama::{MAX_SEQ_LEN, ModelWeights};
use hf_hub::api::sync::{Api, ApiBuilder};
use tokenizers::Tokenizer;

use super::pipeline::{GenerationConfig, InferenceError, TextGenerator};
use crate::config::ModelSettings;

pub struct LocalPipeline {
    engine: Arc<Engine>,
    name: String,
}

struct Engine {
    // forward() needs &mut for the kv cache, so requests take turns
    model: Mutex<ModelWeights>,
    tokenizer: Tokenizer,
    device: Device,
    config: GenerationConfig,
    stop_ids: Vec<u32>,
}

impl LocalPipeline {
    /// Downloads (or reuses cached) weights and tokenizer, then places the
    /// model on the GPU. Blocking; call from the blocking pool.
    pub fn load(settings: &ModelSettings, config: GenerationConfig) -> Result<Self, InferenceError> {
        let device = select_device(settings.require_gpu)?;
        tracing::info!("Selected device: {:?}", device);

        let api = ApiBuilder::new()
            .with_token(settings.hf_token.clone())
            .with_progress(false)
            .build()
            .map_err(|e| InferenceError::Download {
                repo: settings.model_repo.clone(),
                file: settings.model_file.clone(),
                reason: e.to_string(),
            })?;

        let model_path = resolve_file(&api, &settings.model_repo, &settings.model_file)?;
        let tokenizer_path = resolve_file(&api, &settings.tokenizer_repo, "tokenizer.json")?;

        tracing::info!("Loading quantized weights from {}", model_path.display());
        let mut file = File::open(&model_path)?;
        let content = gguf_file::Content::read(&mut file)?;
        let model = ModelWeights::from_gguf(content, &mut file, &device)?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))?;
        let stop_ids = resolve_stop_ids(&tokenizer, &config.stop_tokens)?;

        Ok(Self {
            engine: Arc::new(Engine {
                model: Mutex::new(model),
                tokenizer,
                device,
                config,
                stop_ids,
            }),
            name: format!("local:{}/{}", settings.model_repo, settings.model_file),
        })
    }
}

#[async_trait]
impl TextGenerator for LocalPipeline {
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let engine = Arc::clone(&self.engine);
        let prompt = prompt.to_string();

        // Token loop is CPU/GPU bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || engine.generate(&prompt))
            .await
            .map_err(|e| InferenceError::Worker(e.to_string()))?
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl Engine {
    fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let encoding = self
            .tokenizer
            .encode(prompt, false)
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))?;
        let mut tokens = encoding.get_ids().to_vec();
        let prompt_len = tokens.len();
        self.config.check_context(prompt_len, MAX_SEQ_LEN)?;

        let mut model = self
            .model
            .lock()
            .map_err(|_| InferenceError::Worker("model lock poisoned".to_string()))?;
        let mut sampler = sampler_for(&self.config);
        let mut index_pos = 0;

        for _ in 0..self.config.max_new_tokens {
            // First step feeds the whole prompt, then one token at a time.
            let context = if index_pos == 0 {
                &tokens[..]
            } else {
                &tokens[tokens.len() - 1..]
            };
            let input = Tensor::new(context, &self.device)?.unsqueeze(0)?;
            let logits = model.forward(&input, index_pos)?.squeeze(0)?;
            index_pos += context.len();

            let logits = if self.config.repeat_penalty == 1.0 {
                logits
            } else {
                let start = self.config.repeat_window_start(tokens.len());
                candle_transformers::utils::apply_repeat_penalty(
                    &logits,
                    self.config.repeat_penalty,
                    &tokens[start..],
                )?
            };

            let next = sampler.sample(&logits)?;
            if self.stop_ids.contains(&next) {
                break;
            }
            tokens.push(next);
        }

        let generated = &tokens[prompt_len..];
        tracing::debug!("Generated {} tokens", generated.len());
        self.tokenizer
            .decode(generated, true)
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))
    }
}

fn sampler_for(config: &GenerationConfig) -> LogitsProcessor {
    let sampling = if !config.do_sample || config.temperature <= 0.0 {
        Sampling::ArgMax
    } else {
        Sampling::TopP {
            p: config.top_p,
            temperature: config.temperature,
        }
    };
    LogitsProcessor::from_sampling(config.sampling_seed(), sampling)
}

fn select_device(require_gpu: bool) -> Result<Device, InferenceError> {
    if candle_core::utils::cuda_is_available() {
        return Ok(Device::new_cuda(0)?);
    }
    if require_gpu {
        return Err(InferenceError::GpuUnavailable);
    }
    tracing::warn!("No CUDA device detected, running on CPU (slow)");
    Ok(Device::Cpu)
}

// A path that already exists on disk wins over a hub lookup.
fn resolve_file(api: &Api, repo: &str, file: &str) -> Result<PathBuf, InferenceError> {
    let local = Path::new(file);
    if local.is_file() {
        return Ok(local.to_path_buf());
    }
    tracing::info!("Fetching {} from {}", file, repo);
    api.model(repo.to_string())
        .get(file)
        .map_err(|e| InferenceError::Download {
            repo: repo.to_string(),
            file: file.to_string(),
            reason: e.to_string(),
        })
}

fn resolve_stop_ids(tokenizer: &Tokenizer, stop_tokens: &[String]) -> Result<Vec<u32>, InferenceError> {
    stop_tokens
        .iter()
        .map(|token| {
            tokenizer
                .token_to_id(token)
                .ok_or_else(|| InferenceError::UnknownStopToken(token.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_decoding_when_sampling_is_disabled() {
        let config = GenerationConfig {
            do_sample: false,
            ..Default::default()
        };
        let mut sampler = sampler_for(&config);
        let logits = Tensor::new(&[0.1f32, 2.0, 0.3, 1.9], &Device::Cpu).unwrap();
        assert_eq!(sampler.sample(&logits).unwrap(), 1);
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let config = GenerationConfig {
            seed: Some(1234),
            ..Default::default()
        };
        let logits = Tensor::new(&[1.0f32, 1.1, 0.9, 1.05, 0.95], &Device::Cpu).unwrap();
        let first: Vec<u32> = {
            let mut sampler = sampler_for(&config);
            (0..8).map(|_| sampler.sample(&logits).unwrap()).collect()
        };
        let second: Vec<u32> = {
            let mut sampler = sampler_for(&config);
            (0..8).map(|_| sampler.sample(&logits).unwrap()).collect()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn cpu_allowed_only_when_gpu_is_optional() {
        if candle_core::utils::cuda_is_available() {
            return;
        }
        assert!(matches!(select_device(true), Err(InferenceError::GpuUnavailable)));
        assert!(matches!(select_device(false), Ok(Device::Cpu)));
    }
}
