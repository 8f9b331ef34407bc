pub mod handlers;
pub mod middleware;

use crate::{models::ModelManager, utils::error::PredictError, Config, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub models: Arc<ModelManager>,
}

impl AppState {
    pub fn new(config: Config, models: Arc<ModelManager>) -> Self {
        Self { config, models }
    }
}

/// Load the models, bind the listener and serve until shutdown.
pub async fn serve(config: Config) -> Result<()> {
    // Models must be in place before the first request is accepted.
    let models = Arc::new(ModelManager::load(&config)?);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        PredictError::Internal(format!("Failed to bind to address {}: {}", addr, e))
    })?;

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /        - Welcome message");
    tracing::info!("  POST /predict - Multipart image upload (field 'file')");

    serve_with_listener(listener, AppState::new(config, models)).await
}

/// Serve the application on an already bound listener.
pub async fn serve_with_listener(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, create_app(state))
        .await
        .map_err(|e| PredictError::Internal(format!("Server failed: {}", e)))
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home_handler))
        .route("/predict", post(handlers::predict_handler))
        // Uploads are read whole; no size cap.
        .layer(DefaultBodyLimit::disable())
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
