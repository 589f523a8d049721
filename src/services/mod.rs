pub mod chatbot;
pub mod itinerary;
pub mod local_llm;
pub mod metrics_manager;
pub mod pipeline;
pub mod prompt;
pub mod remote_llm;
