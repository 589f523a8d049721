// src/state.rs
use std::sync::Arc;

use crate::error::AppError;
use crate::services::chatbot::Chatbot;
use crate::services::metrics_manager::MetricsManager;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    /// `None` when the model failed to load at startup.
    pub chatbot: Option<Chatbot>,
    pub metrics: MetricsManager,
}

impl AppState {
    pub fn new(chatbot: Option<Chatbot>) -> Self {
        Self {
            chatbot,
            metrics: MetricsManager::new(),
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.chatbot.is_some()
    }

    pub fn chatbot(&self) -> Result<&Chatbot, AppError> {
        self.chatbot.as_ref().ok_or(AppError::ModelNotLoaded)
    }
}
