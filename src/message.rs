// src/message.rs
use serde::{Deserialize, Serialize};

use crate::services::itinerary::Itinerary;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub user_input: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub response: String,
    pub itinerary: Option<Itinerary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
