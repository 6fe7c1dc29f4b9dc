use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: Option<i64>,
    pub patient_data: Value,
    pub risk_score: f64,
    pub risk_level: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new(patient_data: Value, risk_score: f64, risk_level: String, confidence: f64) -> Self {
        Self {
            id: None,
            patient_data,
            risk_score,
            risk_level,
            confidence,
            created_at: Utc::now(),
        }
    }
}
