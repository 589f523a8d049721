// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorResponse;
use crate::services::pipeline::InferenceError;

pub const INVALID_INPUT: &str = "Invalid input. 'user_input' is required.";
pub const MODEL_NOT_LOADED: &str = "Model not loaded. Please check server logs.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Model not loaded. Please check server logs.")]
    ModelNotLoaded,
    #[error(transparent)]
    Generation(#[from] InferenceError),
}

impl AppError {
    pub fn invalid_input() -> Self {
        AppError::BadRequest(INVALID_INPUT.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ModelNotLoaded | AppError::Generation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
