use axum::{Json, extract::State, http::StatusCode};

use crate::{
    error::MODEL_NOT_LOADED, message::StatusResponse,
    services::metrics_manager::MetricsData, state::SharedState,
};

pub async fn status_handler(State(state): State<SharedState>) -> (StatusCode, Json<StatusResponse>) {
    if state.model_loaded() {
        let status = "Model loaded and server is running.".to_string();
        (StatusCode::OK, Json(StatusResponse { status }))
    } else {
        let status = MODEL_NOT_LOADED.to_string();
        (StatusCode::INTERNAL_SERVER_ERROR, Json(StatusResponse { status }))
    }
}

pub async fn metrics_handler(State(state): State<SharedState>) -> Json<MetricsData> {
    Json(state.metrics.snapshot().await)
}
