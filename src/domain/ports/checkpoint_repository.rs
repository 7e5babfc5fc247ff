use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};

/// Resumable cursor + counters for a batch job, persisted between
/// invocations so a run that hits its wall-clock budget can continue
/// instead of restarting.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunCheckpoint {
    pub job: String,
    /// Last report id the scan got through.
    pub cursor: String,
    pub processed: usize,
    pub updated_at: DateTime<Utc>,
}

pub trait CheckpointRepository: Send + Sync {
    fn load(&self, job: &str) -> Result<Option<RunCheckpoint>, DomainError>;
    fn save(&self, checkpoint: &RunCheckpoint) -> Result<(), DomainError>;
    fn clear(&self, job: &str) -> Result<(), DomainError>;
}
