use super::model::RiskModel;
use super::types::TrainingReport;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingJob {
    pub id: Uuid,
    pub status: TrainingStatus,
    pub submitted_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<TrainingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Registry of background training runs. Submission returns immediately with
/// a job id; callers poll for the outcome. Failure detail stays in the logs,
/// the job record only carries a generic message.
pub struct TrainingJobs {
    jobs: Arc<Mutex<HashMap<Uuid, TrainingJob>>>,
}

impl TrainingJobs {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn spawn(&self, model: Arc<dyn RiskModel>) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let job = TrainingJob {
            id,
            status: TrainingStatus::Running,
            submitted_at: Utc::now(),
            finished_at: None,
            results: None,
            error: None,
        };

        {
            let mut jobs = self.lock_jobs()?;
            jobs.insert(id, job);
        }

        let jobs = Arc::clone(&self.jobs);
        tokio::spawn(async move {
            info!("Training job started: {}", id);
            let outcome = model.train().await;

            let Ok(mut jobs) = jobs.lock() else {
                error!("Training job table poisoned, dropping result for {}", id);
                return;
            };
            let Some(job) = jobs.get_mut(&id) else {
                return;
            };

            job.finished_at = Some(Utc::now());
            match outcome {
                Ok(report) => {
                    info!("Training job completed: {}", id);
                    job.status = TrainingStatus::Completed;
                    job.results = Some(report);
                }
                Err(e) => {
                    error!("Training error: {}", e);
                    job.status = TrainingStatus::Failed;
                    job.error = Some("Model training failed".to_string());
                }
            }
        });

        Ok(id)
    }

    pub fn status(&self, id: Uuid) -> Result<Option<TrainingJob>> {
        let jobs = self.lock_jobs()?;
        Ok(jobs.get(&id).cloned())
    }

    fn lock_jobs(&self) -> Result<MutexGuard<'_, HashMap<Uuid, TrainingJob>>> {
        self.jobs
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))
    }
}

impl Default for TrainingJobs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::types::Prediction;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    struct StubModel {
        fail: bool,
    }

    #[async_trait]
    impl RiskModel for StubModel {
        async fn predict(&self, _patient: &Value) -> crate::Result<Prediction> {
            Ok(Prediction {
                risk_score: 10.0,
                risk_level: "Low".to_string(),
                confidence: 1.0,
            })
        }

        async fn train(&self) -> crate::Result<TrainingReport> {
            if self.fail {
                return Err(Error::training("no usable data"));
            }
            Ok(TrainingReport {
                model: "stub".to_string(),
                samples: 4,
                epochs: 1,
                accuracy: 1.0,
                loss: 0.0,
                duration_ms: 0,
            })
        }
    }

    async fn wait_for_terminal(jobs: &TrainingJobs, id: Uuid) -> TrainingJob {
        for _ in 0..100 {
            let job = jobs.status(id).unwrap().unwrap();
            if job.status != TrainingStatus::Running {
                return job;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        }
        panic!("training job never reached a terminal state");
    }

    #[tokio::test]
    async fn test_successful_job_lifecycle() {
        let jobs = TrainingJobs::new();
        let id = jobs.spawn(Arc::new(StubModel { fail: false })).unwrap();

        let job = wait_for_terminal(&jobs, id).await;
        assert_eq!(job.id, id);
        assert_eq!(job.status, TrainingStatus::Completed);
        assert!(job.finished_at.is_some());
        assert!(job.error.is_none());
        assert_eq!(job.results.unwrap().model, "stub");
    }

    #[tokio::test]
    async fn test_failed_job_reports_generic_error() {
        let jobs = TrainingJobs::new();
        let id = jobs.spawn(Arc::new(StubModel { fail: true })).unwrap();

        let job = wait_for_terminal(&jobs, id).await;
        assert_eq!(job.status, TrainingStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("Model training failed"));
        assert!(job.results.is_none());
    }

    #[tokio::test]
    async fn test_unknown_job_is_none() {
        let jobs = TrainingJobs::new();
        assert!(jobs.status(Uuid::new_v4()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_jobs_are_tracked_independently() {
        let jobs = TrainingJobs::new();
        let ok = jobs.spawn(Arc::new(StubModel { fail: false })).unwrap();
        let bad = jobs.spawn(Arc::new(StubModel { fail: true })).unwrap();
        assert_ne!(ok, bad);

        let ok_job = wait_for_terminal(&jobs, ok).await;
        let bad_job = wait_for_terminal(&jobs, bad).await;
        assert_eq!(ok_job.status, TrainingStatus::Completed);
        assert_eq!(bad_job.status, TrainingStatus::Failed);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TrainingStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }
}
