use crate::domain::entities::pattern::PatternStatus;
use crate::domain::error::DomainError;
use crate::domain::ports::pattern_repository::PatternRepository;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// A pattern this young with this many reports is almost certainly the shadow
/// of a bulk data load, not a real-world flap.
const SURGE_REPORT_THRESHOLD: usize = 500;
const SURGE_TITLE_MARKERS: &[&str] = &["1000", "1300"];
const RECENT_WINDOW_DAYS: i64 = 7;

pub const ARCHIVE_REASON_BULK_IMPORT: &str = "bulk_import_artifact";

pub struct ArtifactGuard {
    patterns: Arc<dyn PatternRepository>,
}

#[derive(Debug, Serialize)]
pub struct GuardSweep {
    pub scanned: usize,
    pub archived: Vec<String>,
    pub errors: Vec<String>,
}

impl ArtifactGuard {
    pub fn new(patterns: Arc<dyn PatternRepository>) -> Self {
        Self { patterns }
    }

    /// Quarantine freshly detected patterns that look like ingestion
    /// artifacts. Archival only flips status and stamps metadata; rows and
    /// member links are left in place.
    pub fn run(&self, now: DateTime<Utc>) -> Result<GuardSweep, DomainError> {
        let mut scanned = 0;
        let mut archived = Vec::new();
        let mut errors = Vec::new();

        for pattern in self.patterns.list(None, None)? {
            if pattern.status == PatternStatus::Archived {
                continue;
            }
            if (now - pattern.first_detected_at).num_days() > RECENT_WINDOW_DAYS {
                continue;
            }
            scanned += 1;

            let surge_count = pattern.report_count >= SURGE_REPORT_THRESHOLD;
            let surge_title = SURGE_TITLE_MARKERS.iter().any(|m| pattern.title.contains(m));
            if !surge_count && !surge_title {
                continue;
            }

            let mut pattern = pattern;
            pattern.status = PatternStatus::Archived;
            let mut metadata = match pattern.metadata.take() {
                Some(serde_json::Value::Object(map)) => map,
                _ => serde_json::Map::new(),
            };
            metadata.insert(
                "archived_reason".to_string(),
                serde_json::Value::String(ARCHIVE_REASON_BULK_IMPORT.to_string()),
            );
            metadata.insert(
                "archived_at".to_string(),
                serde_json::Value::String(now.to_rfc3339()),
            );
            pattern.metadata = Some(serde_json::Value::Object(metadata));

            match self.patterns.update(&pattern) {
                Ok(()) => archived.push(pattern.id),
                Err(e) => errors.push(format!("Failed to archive pattern {}: {e}", pattern.id)),
            }
        }

        Ok(GuardSweep {
            scanned,
            archived,
            errors,
        })
    }
}
