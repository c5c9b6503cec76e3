pub mod core;
pub mod error_handler;
pub mod middleware_layer;
pub mod routes;

use std::sync::Arc;

use ai_llm_service::{GroundedModel, LanguageModel, error_handler::must_env};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use colored::Colorize;
use tokio::signal;
use tracing::{error, info};

use crate::{
    core::app_state::{AppState, LiveState},
    error_handler::AppError,
    middleware_layer::json_extractor::json_error_mapper,
    routes::{chat::chat_route::chat_route, health_route::health_route},
};

/// Builds the app from environment and serves it on `API_ADDRESS` until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let host_url = must_env("API_ADDRESS")?;
    let state = Arc::new(LiveState::from_env()?);

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;

    println!(
        "{} {}",
        "hackbot listening on".green().bold(),
        host_url.cyan()
    );
    info!(address = %host_url, "server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// HTTP routes over any model/grounding pair.
pub fn router<M, G>(state: Arc<AppState<M, G>>) -> Router
where
    M: LanguageModel + 'static,
    G: GroundedModel + 'static,
{
    Router::new()
        .route("/chat", post(chat_route::<M, G>))
        .route("/health", get(health_route::<M, G>))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
