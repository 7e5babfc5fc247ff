use crate::domain::entities::pattern::{Pattern, PatternReportLink, PatternStatus, PatternType};
use crate::domain::error::DomainError;
use crate::domain::values::geo::Coordinates;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PatternStats {
    pub total_patterns: usize,
    pub by_status: Vec<(String, usize)>,
    pub by_type: Vec<(String, usize)>,
    pub total_links: usize,
}

pub trait PatternRepository: Send + Sync {
    /// Insert or update by natural key `(pattern_type, centroid_cell)`.
    /// Returns the id of the stored row, which is the existing row's id when
    /// a concurrent invocation already inserted the same cell.
    fn upsert(&self, pattern: &Pattern) -> Result<String, DomainError>;

    /// Full-row update by id, as a single atomic statement.
    fn update(&self, pattern: &Pattern) -> Result<(), DomainError>;

    /// Status-only update. Does not touch `last_updated_at`, so lifecycle
    /// passes never reset the staleness clock they are measuring.
    fn set_status(&self, id: &str, status: PatternStatus) -> Result<(), DomainError>;

    fn get_by_id(&self, id: &str) -> Result<Option<Pattern>, DomainError>;

    fn list(
        &self,
        status: Option<PatternStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Pattern>, DomainError>;

    /// Patterns of `pattern_type` whose centroid lies within
    /// `tolerance_deg` of `centroid` on both axes, in id order.
    fn find_near(
        &self,
        centroid: &Coordinates,
        tolerance_deg: f64,
        pattern_type: PatternType,
    ) -> Result<Vec<Pattern>, DomainError>;

    /// Bulk conflict-ignoring link insert. Returns how many rows were
    /// actually inserted; duplicates count as success, not errors.
    fn link_reports(&self, links: &[PatternReportLink]) -> Result<usize, DomainError>;

    fn linked_report_ids(&self, pattern_id: &str) -> Result<HashSet<String>, DomainError>;

    fn link_count(&self, pattern_id: &str) -> Result<usize, DomainError>;

    fn stats(&self) -> Result<PatternStats, DomainError>;
}
