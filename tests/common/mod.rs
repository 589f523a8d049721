#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use itinerary_backend::services::chatbot::Chatbot;
use itinerary_backend::services::pipeline::{InferenceError, TextGenerator};
use itinerary_backend::services::prompt::PromptTemplate;
use itinerary_backend::state::AppState;

pub const SAMPLE_ITINERARY: &str = "
**Dia 1: Chegada em Lisboa**

| Período | Atividade | Dicas e Detalhes |
|---|---|---|
| Manhã | Castelo de São Jorge | Chegue cedo para evitar filas |
| Tarde | Alfama | Suba de elétrico 28 |
| Noite | Fado no Bairro Alto | Reserve mesa |

**Dia 2: Belém**

| Período | Atividade | Dicas e Detalhes |
|---|---|---|
| Manhã | Mosteiro dos Jerónimos | Entrada gratuita aos domingos |
| Tarde | Pastéis de Belém | Peça canela |
";

/// Returns a canned completion and remembers the prompts it was given.
pub struct StubGenerator {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .map_err(InferenceError::Worker)
    }

    fn describe(&self) -> String {
        "stub".to_string()
    }
}

pub fn chatbot_with(generator: Arc<StubGenerator>) -> Chatbot {
    Chatbot::new(generator, PromptTemplate::itinerary())
}

pub fn loaded_state(generator: Arc<StubGenerator>) -> Arc<AppState> {
    Arc::new(AppState::new(Some(chatbot_with(generator))))
}

pub fn unloaded_state() -> Arc<AppState> {
    Arc::new(AppState::new(None))
}
