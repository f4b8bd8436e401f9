//! Main Entrypoint for the Quizdrill API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the completion, transcription, and synthesis clients.
//! 3. Constructing the session controller and Axum router.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use quizdrill_api::{config::Config, router::create_router, state::AppState};
use quizdrill_core::{
    completion::OpenAiCompatibleCompletion, session::SessionController,
    synthesis::OpenAiCompatibleSynthesis, transcription::OpenAiCompatibleTranscription,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let openai_config = OpenAIConfig::new()
        .with_api_key(config.api_key())
        .with_api_base(config.provider.api_base());

    let completion = Arc::new(OpenAiCompatibleCompletion::new(
        openai_config.clone(),
        config.chat_model.clone(),
    ));
    let transcription = Arc::new(OpenAiCompatibleTranscription::new(
        openai_config.clone(),
        config.transcription_model.clone(),
    ));
    let synthesis = Arc::new(OpenAiCompatibleSynthesis::new(
        openai_config,
        config.speech_model.clone(),
    ));

    let app_state = Arc::new(AppState {
        controller: Arc::new(SessionController::new(completion, transcription)),
        synthesis,
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        provider = ?config.provider,
        chat_model = %config.chat_model,
        transcription_model = %config.transcription_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
