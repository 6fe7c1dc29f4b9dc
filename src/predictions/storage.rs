use super::PredictionRecord;
use crate::{Error, Result};
use libsql::{Builder, Database};
use tracing::{debug, info};

pub struct PredictionStore {
    db: Database,
}

impl PredictionStore {
    /// Opens (or creates) the database at `db_path` and ensures the
    /// predictions table exists. `:memory:` is supported for tests.
    /// A database that cannot be opened is a hard error; there is no
    /// in-memory fallback.
    pub async fn new(db_path: &str) -> Result<Self> {
        let db = Builder::new_local(db_path).build().await?;

        let conn = db.connect()?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_data TEXT NOT NULL,
                risk_score REAL NOT NULL,
                risk_level TEXT NOT NULL,
                confidence REAL NOT NULL,
                created_at DATETIME NOT NULL
            )
            "#,
            (),
        )
        .await?;

        info!("Database initialized successfully: {}", db_path);
        Ok(Self { db })
    }

    pub async fn save(&self, record: &PredictionRecord) -> Result<()> {
        let conn = self.db.connect()?;
        let patient_json = serde_json::to_string(&record.patient_data)?;

        conn.execute(
            "INSERT INTO predictions (patient_data, risk_score, risk_level, confidence, created_at) \
             VALUES (?, ?, ?, ?, ?)",
            (
                patient_json,
                record.risk_score,
                record.risk_level.as_str(),
                record.confidence,
                record.created_at.to_rfc3339(),
            ),
        )
        .await?;

        debug!("Prediction saved: risk_level={}", record.risk_level);
        Ok(())
    }

    /// Returns the most recent predictions, newest first, capped at `limit`.
    pub async fn recent(&self, limit: u32) -> Result<Vec<PredictionRecord>> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(
                "SELECT id, patient_data, risk_score, risk_level, confidence, created_at \
                 FROM predictions ORDER BY created_at DESC LIMIT ?",
                [i64::from(limit)],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let patient_json: String = row.get(1)?;
            let patient_data = serde_json::from_str(&patient_json)?;

            let created_at_str: String = row.get(5)?;
            let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
                .map_err(|e| Error::internal(format!("Failed to parse timestamp: {e}")))?
                .with_timezone(&chrono::Utc);

            records.push(PredictionRecord {
                id: Some(row.get(0)?),
                patient_data,
                risk_score: row.get(2)?,
                risk_level: row.get(3)?,
                confidence: row.get(4)?,
                created_at,
            });
        }

        debug!("Retrieved {} predictions", records.len());
        Ok(records)
    }
}
