use async_trait::async_trait;
use oncorisk::{
    Error, Result,
    ml::{Prediction, RiskModel, TrainingReport},
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Deterministic risk model for testing
#[derive(Debug)]
pub struct MockRiskModel {
    pub prediction: Prediction,
    pub report: TrainingReport,
    pub predict_error: Option<String>,
    pub train_error: Option<String>,
    pub train_delay: Option<Duration>,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl MockRiskModel {
    pub fn new() -> Self {
        Self {
            prediction: Prediction {
                risk_score: 42.0,
                risk_level: "Medium".to_string(),
                confidence: 0.9,
            },
            report: TrainingReport {
                model: "mock".to_string(),
                samples: 10,
                epochs: 1,
                accuracy: 0.95,
                loss: 0.1,
                duration_ms: 3,
            },
            predict_error: None,
            train_error: None,
            train_delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_prediction(mut self, risk_score: f64, risk_level: &str, confidence: f64) -> Self {
        self.prediction = Prediction {
            risk_score,
            risk_level: risk_level.to_string(),
            confidence,
        };
        self
    }

    pub fn with_predict_error(mut self, error: &str) -> Self {
        self.predict_error = Some(error.to_string());
        self
    }

    pub fn with_train_error(mut self, error: &str) -> Self {
        self.train_error = Some(error.to_string());
        self
    }

    pub fn with_train_delay(mut self, delay: Duration) -> Self {
        self.train_delay = Some(delay);
        self
    }

    pub fn get_requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RiskModel for MockRiskModel {
    async fn predict(&self, patient: &Value) -> Result<Prediction> {
        self.requests.lock().unwrap().push(patient.clone());

        if let Some(ref error) = self.predict_error {
            return Err(Error::model(error.clone()));
        }
        Ok(self.prediction.clone())
    }

    async fn train(&self) -> Result<TrainingReport> {
        if let Some(delay) = self.train_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ref error) = self.train_error {
            return Err(Error::training(error.clone()));
        }
        Ok(self.report.clone())
    }
}

impl Default for MockRiskModel {
    fn default() -> Self {
        Self::new()
    }
}
