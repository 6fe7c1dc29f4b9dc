mod jobs;
mod model;
mod types;

pub use jobs::{TrainingJob, TrainingJobs, TrainingStatus};
pub use model::{FEATURES, LogisticModel, RiskModel};
pub use types::{ModelArtifact, Prediction, ScalerArtifact, TrainingReport};
