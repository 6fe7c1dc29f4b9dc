use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub risk_score: f64,
    pub risk_level: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model: String,
    pub samples: usize,
    pub epochs: usize,
    pub accuracy: f64,
    pub loss: f64,
    pub duration_ms: u64,
}

/// On-disk weight file: bias plus one weight per feature name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub bias: f64,
    pub weights: HashMap<String, f64>,
}

/// On-disk scaler file: per-feature standardization parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub means: HashMap<String, f64>,
    pub stds: HashMap<String, f64>,
}
