// src/services/chatbot.rs
use std::sync::Arc;

use super::local_llm::LocalPipeline;
use super::pipeline::{InferenceError, TextGenerator};
use super::prompt::PromptTemplate;
use super::remote_llm::RemotePipeline;
use crate::config::{Backend, Settings};

/// Prompt rendering, inference and output trimming chained into one call.
#[derive(Clone)]
pub struct Chatbot {
    generator: Arc<dyn TextGenerator>,
    template: PromptTemplate,
}

impl std::fmt::Debug for Chatbot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chatbot")
            .field("generator", &self.generator.describe())
            .finish()
    }
}

impl Chatbot {
    pub fn new(generator: Arc<dyn TextGenerator>, template: PromptTemplate) -> Self {
        Self { generator, template }
    }

    /// Builds the configured pipeline. Loading local weights blocks for a
    /// long time, so callers run this on the blocking pool.
    pub fn load(settings: &Settings) -> Result<Self, InferenceError> {
        let generator: Arc<dyn TextGenerator> = match settings.backend {
            Backend::Local => Arc::new(LocalPipeline::load(
                &settings.model,
                settings.generation.clone(),
            )?),
            Backend::Remote => Arc::new(RemotePipeline::new(
                &settings.model.remote_url,
                settings.generation.clone(),
            )),
        };
        tracing::info!("Chatbot initialized with {}", generator.describe());
        Ok(Self::new(generator, PromptTemplate::itinerary()))
    }

    pub fn describe(&self) -> String {
        self.generator.describe()
    }

    pub async fn generate_response(&self, user_input: &str) -> Result<String, InferenceError> {
        let prompt = self.template.render(user_input);
        tracing::info!("Starting itinerary generation");
        let output = self.generator.generate(&prompt).await?;
        tracing::info!("Itinerary generated ({} chars)", output.len());
        Ok(output.trim().to_string())
    }
}
