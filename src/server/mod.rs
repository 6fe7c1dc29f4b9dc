pub mod handlers;
pub mod types;

use crate::Result;
use crate::config::Config;
use crate::ml::{LogisticModel, TrainingJobs};
use crate::predictions::PredictionStore;
use axum::{
    Router,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Builds the API router over the given application state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/predict", post(handlers::predict))
        .route("/api/patients", get(handlers::patients))
        .route("/api/train", post(handlers::train))
        .route("/api/train/:job_id", get(handlers::training_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    // Storage must come up before the server accepts traffic; an unusable
    // database path is fatal here rather than a 500 on every request.
    let store = PredictionStore::new(&config.database.path).await?;
    let model = LogisticModel::new(config.model.clone());

    let state = AppState {
        store: Arc::new(store),
        model: Arc::new(model),
        jobs: Arc::new(TrainingJobs::new()),
    };

    let app = router(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
