use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use oncorisk::config::{
    Config, DatabaseConfig, LogsConfig, ModelConfig, SecurityConfig, ServerConfig,
};
use oncorisk::ml::{RiskModel, TrainingJobs};
use oncorisk::predictions::PredictionStore;
use oncorisk::server::{self, handlers::AppState};
use serde_json::{Value, json};
use std::sync::Arc;

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            debug: true,
        },
        database: DatabaseConfig {
            path: ":memory:".to_string(),
        },
        model: ModelConfig {
            model_path: "/nonexistent/model.json".to_string(),
            scaler_path: "/nonexistent/scaler.json".to_string(),
            training_data_path: "/nonexistent/cancer_data.csv".to_string(),
        },
        security: SecurityConfig {
            secret_key: "test-secret".to_string(),
            jwt_secret_key: "test-secret".to_string(),
        },
        logs: LogsConfig {
            level: "debug".to_string(),
        },
    }
}

/// Create an in-memory prediction store
pub async fn create_test_store() -> PredictionStore {
    PredictionStore::new(":memory:")
        .await
        .expect("Failed to open in-memory store")
}

/// Build the full API router over the given model, backed by a fresh
/// in-memory store and an empty job registry
pub async fn create_test_app(model: Arc<dyn RiskModel>) -> Router {
    let state = AppState {
        store: Arc::new(create_test_store().await),
        model,
        jobs: Arc::new(TrainingJobs::new()),
    };
    server::router(state)
}

/// A prediction payload with every required field present
pub fn sample_patient() -> Value {
    json!({
        "age": 45,
        "gender": "F",
        "smoking": false,
        "drinking": false,
        "familyHistory": true,
        "exerciseFrequency": "low"
    })
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

/// Decode a response body into JSON
pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not valid JSON")
}
