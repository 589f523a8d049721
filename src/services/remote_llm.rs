// src/services/remote_llm.rs
//
// Client for a completions server running next to this service
// (llama.cpp server, vLLM, ...). Same prompt, same decoding parameters.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pipeline::{GenerationConfig, InferenceError, TextGenerator};

pub struct RemotePipeline {
    client: reqwest::Client,
    endpoint: String,
    config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_tokens: usize,
    temperature: f64,
    top_p: f64,
    repeat_penalty: f32,
    /// -1 asks the server to penalize the whole context.
    repeat_last_n: i64,
    stop: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

impl RemotePipeline {
    pub fn new(base_url: &str, config: GenerationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/v1/completions", base_url.trim_end_matches('/')),
            config,
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            prompt,
            max_tokens: self.config.max_new_tokens,
            temperature: if self.config.do_sample {
                self.config.temperature
            } else {
                0.0
            },
            top_p: self.config.top_p,
            repeat_penalty: self.config.repeat_penalty,
            repeat_last_n: self
                .config
                .repeat_last_n
                .map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX)),
            stop: &self.config.stop_tokens,
            seed: self.config.seed,
            stream: false,
        }
    }
}

#[async_trait]
impl TextGenerator for RemotePipeline {
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let res = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(InferenceError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = res.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or(InferenceError::EmptyCompletion)
    }

    fn describe(&self) -> String {
        format!("remote:{}", self.endpoint)
    }
}
