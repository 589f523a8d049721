use std::time::Instant;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    error::AppError,
    message::{GenerateRequest, GenerateResponse, ItineraryResponse},
    services::{itinerary::parse_itinerary, metrics_manager::Outcome},
    state::SharedState,
};

type Payload = Result<Json<GenerateRequest>, JsonRejection>;

pub async fn generate_response_handler(
    State(state): State<SharedState>,
    payload: Payload,
) -> Result<Json<GenerateResponse>, AppError> {
    let response = run_generation(&state, payload).await?;
    Ok(Json(GenerateResponse { response }))
}

// Same flow, plus the day-by-day tables parsed out of the Markdown.
pub async fn generate_itinerary_handler(
    State(state): State<SharedState>,
    payload: Payload,
) -> Result<Json<ItineraryResponse>, AppError> {
    let response = run_generation(&state, payload).await?;
    let itinerary = parse_itinerary(&response);
    if itinerary.is_none() {
        tracing::warn!("Generated text has no day tables");
    }
    Ok(Json(ItineraryResponse { response, itinerary }))
}

async fn run_generation(state: &SharedState, payload: Payload) -> Result<String, AppError> {
    // Availability is checked before the body is even looked at.
    let chatbot = match state.chatbot() {
        Ok(chatbot) => chatbot,
        Err(e) => {
            state.metrics.record(Outcome::Unavailable).await;
            return Err(e);
        }
    };

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected payload: {}", rejection.body_text());
            state.metrics.record(Outcome::Rejected).await;
            return Err(AppError::invalid_input());
        }
    };

    tracing::info!("Received user input: {}", request.user_input);
    let started = Instant::now();

    match chatbot.generate_response(&request.user_input).await {
        Ok(response) => {
            let elapsed = started.elapsed();
            tracing::info!("Response generated in {:.1?}", elapsed);
            state.metrics.record(Outcome::Completed).await;
            state.metrics.record_generation(elapsed).await;
            Ok(response)
        }
        Err(e) => {
            tracing::error!("Error generating response: {}", e);
            state.metrics.record(Outcome::Failed).await;
            Err(e.into())
        }
    }
}
