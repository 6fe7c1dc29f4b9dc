use super::types::{ErrorResponse, PredictResponse, StatusResponse, TrainResponse};
use crate::Error;
use crate::ml::{FEATURES, RiskModel, TrainingJob, TrainingJobs};
use crate::predictions::{PredictionRecord, PredictionStore};
use crate::recommendations::recommendations_for;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Most-recent rows the history endpoint will return.
pub const RECENT_PREDICTIONS_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PredictionStore>,
    pub model: Arc<dyn RiskModel>,
    pub jobs: Arc<TrainingJobs>,
}

pub async fn index() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Cancer Prediction API",
        status: "running",
    })
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    // A body that fails to parse as JSON surfaces only the generic message;
    // the parse detail stays in the logs.
    let Json(patient) = payload.map_err(|e| {
        error!("Prediction error: {}", e);
        internal_error()
    })?;

    if let Some(field) = missing_required_field(&patient) {
        info!("Prediction request rejected, missing field: {}", field);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: Error::missing_field(field).to_string(),
            }),
        ));
    }

    let prediction = state.model.predict(&patient).await.map_err(|e| {
        error!("Prediction error: {}", e);
        internal_error()
    })?;

    let record = PredictionRecord::new(
        patient,
        prediction.risk_score,
        prediction.risk_level.clone(),
        prediction.confidence,
    );
    state.store.save(&record).await.map_err(|e| {
        error!("Prediction error: {}", e);
        internal_error()
    })?;

    info!(
        "Prediction completed: risk_level={} risk_score={}",
        prediction.risk_level, prediction.risk_score
    );

    let recommendations = recommendations_for(&prediction.risk_level);
    Ok(Json(PredictResponse {
        risk_score: prediction.risk_score,
        risk_level: prediction.risk_level,
        confidence: prediction.confidence,
        recommendations,
    }))
}

pub async fn patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<PredictionRecord>>, (StatusCode, Json<ErrorResponse>)> {
    match state.store.recent(RECENT_PREDICTIONS_LIMIT).await {
        Ok(records) => {
            info!("Fetched {} patient records", records.len());
            Ok(Json(records))
        }
        Err(e) => {
            error!("Error fetching patients: {}", e);
            Err(internal_error())
        }
    }
}

pub async fn train(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<TrainResponse>), (StatusCode, Json<ErrorResponse>)> {
    match state.jobs.spawn(Arc::clone(&state.model)) {
        Ok(job_id) => {
            info!("Training job submitted: {}", job_id);
            Ok((
                StatusCode::ACCEPTED,
                Json(TrainResponse {
                    message: "Model training started",
                    job_id,
                }),
            ))
        }
        Err(e) => {
            error!("Training error: {}", e);
            Err(internal_error())
        }
    }
}

pub async fn training_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<TrainingJob>, (StatusCode, Json<ErrorResponse>)> {
    // A malformed id is indistinguishable from an unknown one to the caller.
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Training job not found: {job_id}"),
            }),
        )
    };
    let Ok(id) = Uuid::parse_str(&job_id) else {
        return Err(not_found());
    };

    match state.jobs.status(id) {
        Ok(Some(job)) => Ok(Json(job)),
        Ok(None) => Err(not_found()),
        Err(e) => {
            error!("Error fetching training job {}: {}", job_id, e);
            Err(internal_error())
        }
    }
}

/// First required key absent from the payload, in declaration order.
/// Non-object payloads carry no keys at all, so they fail on the first.
pub fn missing_required_field(patient: &Value) -> Option<&'static str> {
    FEATURES
        .into_iter()
        .find(|field| patient.get(field).is_none())
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
}
