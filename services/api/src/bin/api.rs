//! services/api/src/bin/api.rs

use api_lib::{
    adapters::OpenAiClientProvider,
    config::Config,
    error::ApiError,
    web::{build_router, state::AppState},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Completion Provider ---
    // No credential here: each submission connects with its own key.
    let completion_provider = Arc::new(OpenAiClientProvider::new(
        config.llm_api_base.clone(),
        config.quiz_model.clone(),
        config.review_model.clone(),
        config.temperature,
    ));
    info!(
        "Using {} (quiz) and {} (review) at {}",
        config.quiz_model, config.review_model, config.llm_api_base
    );

    // --- 3. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        completion_provider,
    });
    let app = build_router(app_state)?;

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
