mod storage;
mod types;

pub use storage::PredictionStore;
pub use types::PredictionRecord;
