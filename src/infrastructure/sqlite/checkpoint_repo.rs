use crate::domain::error::DomainError;
use crate::domain::ports::checkpoint_repository::{CheckpointRepository, RunCheckpoint};
use chrono::DateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct SqliteCheckpointRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCheckpointRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl CheckpointRepository for SqliteCheckpointRepo {
    fn load(&self, job: &str) -> Result<Option<RunCheckpoint>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT job, cursor, processed, updated_at FROM checkpoints WHERE job = ?1")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![job], |row| {
                let updated_str: String = row.get(3)?;
                Ok(RunCheckpoint {
                    job: row.get(0)?,
                    cursor: row.get(1)?,
                    processed: row.get::<_, i64>(2)? as usize,
                    updated_at: DateTime::parse_from_rfc3339(&updated_str)
                        .map(|dt| dt.with_timezone(&chrono::Utc))
                        .unwrap_or_else(|_| chrono::Utc::now()),
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    fn save(&self, checkpoint: &RunCheckpoint) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO checkpoints (job, cursor, processed, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(job) DO UPDATE SET
                 cursor = excluded.cursor,
                 processed = excluded.processed,
                 updated_at = excluded.updated_at",
            params![
                checkpoint.job,
                checkpoint.cursor,
                checkpoint.processed as i64,
                checkpoint.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to save checkpoint: {e}")))?;
        Ok(())
    }

    fn clear(&self, job: &str) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute("DELETE FROM checkpoints WHERE job = ?1", params![job])
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }
}
