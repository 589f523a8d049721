// src/routes/mod.rs
pub mod generate;
pub mod status;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{get, post},
};
use generate::{generate_itinerary_handler, generate_response_handler};
use status::{metrics_handler, status_handler};
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<SharedState> {
    Router::new()
        .route("/generate_response", post(generate_response_handler))
        .route("/generate_itinerary", post(generate_itinerary_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
}
