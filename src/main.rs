use std::sync::Arc;

use itinerary_backend::{
    config::Settings, routes, services::chatbot::Chatbot, state::AppState,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("itinerary_backend=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let chatbot = load_chatbot(settings.clone()).await;
    let state = Arc::new(AppState::new(chatbot));

    let app = routes::create_router()
        .with_state(state)
        .layer(CorsLayer::very_permissive());

    let listener = TcpListener::bind(settings.bind_addr()).await?;
    tracing::info!("Itinerary service running at http://{}", settings.bind_addr());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

// A failed load leaves the server up; every request then answers 500.
async fn load_chatbot(settings: Settings) -> Option<Chatbot> {
    match tokio::task::spawn_blocking(move || Chatbot::load(&settings)).await {
        Ok(Ok(chatbot)) => Some(chatbot),
        Ok(Err(e)) => {
            tracing::error!("Error initializing chatbot: {}", e);
            None
        }
        Err(e) => {
            tracing::error!("Chatbot loader panicked: {}", e);
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
