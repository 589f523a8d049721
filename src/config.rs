// src/config.rs
use std::str::FromStr;

use thiserror::Error;

use crate::services::pipeline::GenerationConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error("unknown LLM_BACKEND '{0}', expected 'local' or 'remote'")]
    UnknownBackend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Load GGUF weights in-process with candle.
    Local,
    /// Forward prompts to a locally-hosted completions server.
    Remote,
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model_repo: String,
    pub model_file: String,
    pub tokenizer_repo: String,
    pub hf_token: Option<String>,
    pub require_gpu: bool,
    pub remote_url: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub model: ModelSettings,
    pub generation: GenerationConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let backend = match get("LLM_BACKEND", "local").to_lowercase().as_str() {
            "local" => Backend::Local,
            "remote" => Backend::Remote,
            other => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let defaults = GenerationConfig::default();
        let seed = parse_optional(&lookup, "LLM_SEED")?;

        let generation = GenerationConfig {
            max_new_tokens: parse_or(&lookup, "LLM_MAX_NEW_TOKENS", defaults.max_new_tokens)?,
            temperature: parse_or(&lookup, "LLM_TEMPERATURE", defaults.temperature)?,
            top_p: parse_or(&lookup, "LLM_TOP_P", defaults.top_p)?,
            repeat_penalty: parse_or(&lookup, "LLM_REPEAT_PENALTY", defaults.repeat_penalty)?,
            repeat_last_n: parse_optional(&lookup, "LLM_REPEAT_LAST_N")?,
            do_sample: parse_or(&lookup, "LLM_DO_SAMPLE", defaults.do_sample)?,
            seed,
            stop_tokens: defaults.stop_tokens,
        };

        Ok(Self {
            host: get("HOST", "0.0.0.0"),
            port: parse_or(&lookup, "PORT", 5000)?,
            backend,
            model: ModelSettings {
                model_repo: get("MODEL_REPO", "bartowski/Meta-Llama-3.1-8B-Instruct-GGUF"),
                model_file: get("MODEL_FILE", "Meta-Llama-3.1-8B-Instruct-Q4_K_M.gguf"),
                tokenizer_repo: get("TOKENIZER_REPO", "meta-llama/Llama-3.1-8B-Instruct"),
                hf_token: lookup("HF_TOKEN").filter(|t| !t.trim().is_empty()),
                require_gpu: parse_or(&lookup, "LLM_REQUIRE_GPU", true)?,
                remote_url: get("LLM_REMOTE_URL", "http://127.0.0.1:8080"),
            },
            generation,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_optional<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => parse_value(key, &raw).map(Some),
        None => Ok(None),
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
