// src/services/pipeline.rs
use async_trait::async_trait;
use thiserror::Error;

/// Llama 3 end-of-sequence marker.
pub const END_OF_TEXT: &str = "<|end_of_text|>";
/// Llama 3 end-of-turn marker.
pub const END_OF_TURN: &str = "<|eot_id|>";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("CUDA GPU not found; this model must run on a GPU")]
    GpuUnavailable,
    #[error("failed to fetch '{file}' from '{repo}': {reason}")]
    Download {
        repo: String,
        file: String,
        reason: String,
    },
    #[error("model error: {0}")]
    Model(#[from] candle_core::Error),
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
    #[error("stop token '{0}' is not in the tokenizer vocabulary")]
    UnknownStopToken(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("remote backend error: {0}")]
    Remote(#[from] reqwest::Error),
    #[error("remote backend returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },
    #[error("remote backend returned no completion")]
    EmptyCompletion,
    #[error(
        "input too long: {prompt_tokens} prompt tokens plus {max_new_tokens} new tokens exceed the {limit}-token context"
    )]
    ContextOverflow {
        prompt_tokens: usize,
        max_new_tokens: usize,
        limit: usize,
    },
    #[error("inference worker failed: {0}")]
    Worker(String),
}

/// Decoding parameters shared by every pipeline backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub max_new_tokens: usize,
    pub temperature: f64,
    /// Nucleus-sampling threshold.
    pub top_p: f64,
    pub repeat_penalty: f32,
    /// How many trailing tokens the repeat penalty looks at; `None` is the
    /// whole context.
    pub repeat_last_n: Option<usize>,
    pub do_sample: bool,
    /// Forces deterministic output: every call reseeds the sampler with it.
    pub seed: Option<u64>,
    pub stop_tokens: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 2048,
            temperature: 0.5,
            top_p: 0.9,
            repeat_penalty: 1.15,
            repeat_last_n: None,
            do_sample: true,
            seed: None,
            stop_tokens: vec![END_OF_TEXT.to_string(), END_OF_TURN.to_string()],
        }
    }
}

impl GenerationConfig {
    /// Fails before any inference when the prompt plus the generation budget
    /// cannot fit in `limit` tokens.
    pub fn check_context(&self, prompt_tokens: usize, limit: usize) -> Result<(), InferenceError> {
        if prompt_tokens + self.max_new_tokens > limit {
            return Err(InferenceError::ContextOverflow {
                prompt_tokens,
                max_new_tokens: self.max_new_tokens,
                limit,
            });
        }
        Ok(())
    }

    /// Index of the first token the repeat penalty applies to.
    pub fn repeat_window_start(&self, context_len: usize) -> usize {
        match self.repeat_last_n {
            Some(n) => context_len.saturating_sub(n),
            None => 0,
        }
    }

    /// Seed for one generation call.
    pub fn sampling_seed(&self) -> u64 {
        self.seed
            .unwrap_or_else(|| uuid::Uuid::new_v4().as_u64_pair().0)
    }
}

/// A preconfigured text-generation call. Implementations return only the
/// newly generated text, never the prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError>;

    fn describe(&self) -> String;
}
