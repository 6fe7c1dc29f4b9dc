use super::types::{ModelArtifact, Prediction, ScalerArtifact, TrainingReport};
use crate::config::ModelConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The six inputs every prediction request must carry, in validation order.
pub const FEATURES: [&str; 6] = [
    "age",
    "gender",
    "smoking",
    "drinking",
    "familyHistory",
    "exerciseFrequency",
];

const LOW_THRESHOLD: f64 = 0.33;
const HIGH_THRESHOLD: f64 = 0.66;
// Standardized features beyond this many deviations count against confidence.
const FEATURE_RANGE_LIMIT: f64 = 3.0;

const EPOCHS: usize = 200;
const LEARNING_RATE: f64 = 0.05;
const MIN_STD: f64 = 1e-6;

/// Scoring capability the request pipeline depends on. Implementations must
/// be cheap to share behind an `Arc` and safe to call concurrently.
#[async_trait]
pub trait RiskModel: Send + Sync {
    async fn predict(&self, patient: &Value) -> Result<Prediction>;
    async fn train(&self) -> Result<TrainingReport>;
}

struct ModelState {
    weights: [f64; 6],
    bias: f64,
    means: [f64; 6],
    stds: [f64; 6],
}

impl ModelState {
    fn builtin() -> Self {
        Self {
            weights: [0.8, 0.2, 0.9, 0.5, 0.9, -0.7],
            bias: -0.4,
            means: [50.0, 0.5, 0.3, 0.4, 0.2, 1.5],
            stds: [15.0, 0.5, 0.46, 0.49, 0.4, 1.0],
        }
    }

    /// Returns the positive-class probability and the fraction of features
    /// that fall inside the calibrated range.
    fn score(&self, features: &[f64; 6]) -> (f64, f64) {
        let mut activation = self.bias;
        let mut in_range = 0usize;

        for i in 0..FEATURES.len() {
            let z = (features[i] - self.means[i]) / self.stds[i];
            activation += self.weights[i] * z;
            if z.abs() <= FEATURE_RANGE_LIMIT {
                in_range += 1;
            }
        }

        let probability = sigmoid(activation);
        let confidence = in_range as f64 / FEATURES.len() as f64;
        (probability, confidence)
    }
}

/// Standardized logistic-regression scorer with JSON artifacts on disk.
/// Construction never fails: unreadable or invalid artifacts fall back to
/// built-in coefficients so the service can still serve predictions.
pub struct LogisticModel {
    state: RwLock<ModelState>,
    config: ModelConfig,
}

impl LogisticModel {
    pub fn new(config: ModelConfig) -> Self {
        let state = match Self::load_artifacts(&config) {
            Ok(state) => {
                info!("Model artifacts loaded: {}", config.model_path);
                state
            }
            Err(e) => {
                warn!(
                    "Model artifacts unavailable, using built-in coefficients: {}",
                    e
                );
                ModelState::builtin()
            }
        };

        Self {
            state: RwLock::new(state),
            config,
        }
    }

    fn load_artifacts(config: &ModelConfig) -> Result<ModelState> {
        let model: ModelArtifact =
            serde_json::from_str(&std::fs::read_to_string(&config.model_path)?)?;
        let scaler: ScalerArtifact =
            serde_json::from_str(&std::fs::read_to_string(&config.scaler_path)?)?;

        let mut state = ModelState {
            weights: [0.0; 6],
            bias: model.bias,
            means: [0.0; 6],
            stds: [1.0; 6],
        };

        for (i, feature) in FEATURES.iter().enumerate() {
            state.weights[i] = artifact_value(&model.weights, feature, "weight")?;
            state.means[i] = artifact_value(&scaler.means, feature, "mean")?;

            let std = artifact_value(&scaler.stds, feature, "std")?;
            if std <= 0.0 {
                return Err(Error::model(format!(
                    "Scaler std for '{feature}' must be positive, got {std}"
                )));
            }
            state.stds[i] = std;
        }

        Ok(state)
    }

    async fn persist_artifacts(&self, state: &ModelState) -> Result<()> {
        let model = ModelArtifact {
            bias: state.bias,
            weights: feature_map(&state.weights),
        };
        let scaler = ScalerArtifact {
            means: feature_map(&state.means),
            stds: feature_map(&state.stds),
        };

        write_artifact(&self.config.model_path, &serde_json::to_string_pretty(&model)?).await?;
        write_artifact(
            &self.config.scaler_path,
            &serde_json::to_string_pretty(&scaler)?,
        )
        .await?;

        debug!(
            "Model artifacts written: {} {}",
            self.config.model_path, self.config.scaler_path
        );
        Ok(())
    }
}

#[async_trait]
impl RiskModel for LogisticModel {
    async fn predict(&self, patient: &Value) -> Result<Prediction> {
        let features = features_from(patient);

        let (probability, confidence) = {
            let state = self
                .state
                .read()
                .map_err(|e| Error::internal(format!("Model lock poisoned: {e}")))?;
            state.score(&features)
        };

        let prediction = Prediction {
            risk_score: round2(probability * 100.0),
            risk_level: level_for(probability).to_string(),
            confidence: round2(confidence),
        };

        debug!(
            "Scored patient: risk_score={} risk_level={} confidence={}",
            prediction.risk_score, prediction.risk_level, prediction.confidence
        );
        Ok(prediction)
    }

    async fn train(&self) -> Result<TrainingReport> {
        let started = Instant::now();

        let raw = tokio::fs::read_to_string(&self.config.training_data_path)
            .await
            .map_err(|e| {
                Error::training(format!(
                    "Cannot read training data '{}': {}",
                    self.config.training_data_path, e
                ))
            })?;
        let samples = parse_dataset(&raw)?;
        info!(
            "Training on {} samples from {}",
            samples.len(),
            self.config.training_data_path
        );

        let state = fit(&samples);
        let (accuracy, loss) = evaluate(&state, &samples);

        // Artifacts are persisted before the in-memory swap; a failed write
        // leaves the serving model untouched.
        self.persist_artifacts(&state).await?;

        {
            let mut live = self
                .state
                .write()
                .map_err(|e| Error::internal(format!("Model lock poisoned: {e}")))?;
            *live = state;
        }

        let report = TrainingReport {
            model: "logistic_regression".to_string(),
            samples: samples.len(),
            epochs: EPOCHS,
            accuracy,
            loss,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            "Model training completed: accuracy={:.3} loss={:.4} duration_ms={}",
            report.accuracy, report.loss, report.duration_ms
        );
        Ok(report)
    }
}

#[derive(Debug)]
struct Sample {
    features: [f64; 6],
    label: f64,
}

fn parse_dataset(raw: &str) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();

    for (line_no, line) in raw.lines().enumerate() {
        if line_no == 0 {
            continue; // header
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != FEATURES.len() + 1 {
            return Err(Error::training(format!(
                "Line {} has {} columns, expected {}",
                line_no + 1,
                fields.len(),
                FEATURES.len() + 1
            )));
        }

        let mut features = [0.0; 6];
        for (i, field) in fields[..FEATURES.len()].iter().enumerate() {
            features[i] = field.trim().parse::<f64>().map_err(|e| {
                Error::training(format!("Line {}: invalid value '{field}': {e}", line_no + 1))
            })?;
        }

        let label = fields[FEATURES.len()].trim().parse::<f64>().map_err(|e| {
            Error::training(format!("Line {}: invalid diagnosis: {e}", line_no + 1))
        })?;
        if label != 0.0 && label != 1.0 {
            return Err(Error::training(format!(
                "Line {}: diagnosis must be 0 or 1, got {label}",
                line_no + 1
            )));
        }

        samples.push(Sample { features, label });
    }

    if samples.is_empty() {
        return Err(Error::training("Training data contains no samples"));
    }
    Ok(samples)
}

/// Refits the scaler from the data, then runs per-sample gradient descent
/// on the standardized features.
fn fit(samples: &[Sample]) -> ModelState {
    let n = samples.len() as f64;

    let mut means = [0.0; 6];
    for sample in samples {
        for i in 0..FEATURES.len() {
            means[i] += sample.features[i];
        }
    }
    for mean in &mut means {
        *mean /= n;
    }

    let mut stds = [0.0; 6];
    for sample in samples {
        for i in 0..FEATURES.len() {
            let delta = sample.features[i] - means[i];
            stds[i] += delta * delta;
        }
    }
    for std in &mut stds {
        *std = (*std / n).sqrt();
        if *std < MIN_STD {
            *std = MIN_STD; // constant columns still standardize to zero
        }
    }

    let mut weights = [0.0; 6];
    let mut bias = 0.0;
    for _ in 0..EPOCHS {
        for sample in samples {
            let mut activation = bias;
            for i in 0..FEATURES.len() {
                activation += weights[i] * (sample.features[i] - means[i]) / stds[i];
            }
            let error = sigmoid(activation) - sample.label;
            for i in 0..FEATURES.len() {
                weights[i] -= LEARNING_RATE * error * (sample.features[i] - means[i]) / stds[i];
            }
            bias -= LEARNING_RATE * error;
        }
    }

    ModelState {
        weights,
        bias,
        means,
        stds,
    }
}

/// Training-set accuracy at the 0.5 cutoff and mean log-loss.
fn evaluate(state: &ModelState, samples: &[Sample]) -> (f64, f64) {
    let mut correct = 0usize;
    let mut loss = 0.0;

    for sample in samples {
        let (probability, _) = state.score(&sample.features);
        let predicted = if probability >= 0.5 { 1.0 } else { 0.0 };
        if predicted == sample.label {
            correct += 1;
        }
        let clamped = probability.clamp(1e-12, 1.0 - 1e-12);
        loss -= sample.label * clamped.ln() + (1.0 - sample.label) * (1.0 - clamped).ln();
    }

    (correct as f64 / samples.len() as f64, loss / samples.len() as f64)
}

fn features_from(patient: &Value) -> [f64; 6] {
    let mut features = [0.0; 6];
    for (i, name) in FEATURES.iter().enumerate() {
        features[i] = patient
            .get(name)
            .map_or(0.0, |value| feature_value(name, value));
    }
    features
}

/// Lenient coercion: requests are only validated for key presence, so the
/// model accepts booleans, numbers, and common string spellings alike.
fn feature_value(name: &str, value: &Value) -> f64 {
    match name {
        "gender" => gender_value(value),
        "exerciseFrequency" => exercise_value(value),
        _ => numeric(value),
    }
}

fn numeric(value: &Value) -> f64 {
    match value {
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            if let Ok(parsed) = s.trim().parse::<f64>() {
                parsed
            } else {
                match s.trim().to_lowercase().as_str() {
                    "true" | "yes" | "y" => 1.0,
                    _ => 0.0,
                }
            }
        }
        _ => 0.0,
    }
}

fn gender_value(value: &Value) -> f64 {
    match value {
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "m" | "male" => 1.0,
            _ => 0.0,
        },
        other => numeric(other),
    }
}

fn exercise_value(value: &Value) -> f64 {
    match value {
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "none" | "never" => 0.0,
            "low" | "rarely" => 1.0,
            "medium" | "moderate" | "sometimes" => 2.0,
            "high" | "daily" | "often" => 3.0,
            other => other.parse::<f64>().unwrap_or(0.0),
        },
        other => numeric(other),
    }
}

fn level_for(probability: f64) -> &'static str {
    if probability < LOW_THRESHOLD {
        "Low"
    } else if probability < HIGH_THRESHOLD {
        "Medium"
    } else {
        "High"
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn artifact_value(map: &HashMap<String, f64>, feature: &str, kind: &str) -> Result<f64> {
    map.get(feature).copied().ok_or_else(|| {
        Error::model(format!("Artifact is missing a {kind} for '{feature}'"))
    })
}

fn feature_map(values: &[f64; 6]) -> HashMap<String, f64> {
    FEATURES
        .iter()
        .zip(values.iter())
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

async fn write_artifact(path: &str, contents: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}
