use crate::domain::entities::report::{Report, ReportStatus};
use crate::domain::error::DomainError;
use crate::domain::values::category::Category;
use crate::domain::values::geo::Coordinates;
use chrono::{DateTime, Utc};

/// Filter for paged report reads. `after_id` is the resumable cursor: results
/// are always returned in stable id order, strictly after the given id.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub categories: Option<Vec<Category>>,
    pub with_coordinates: bool,
    /// Only reports not yet linked to any pattern.
    pub unassigned_only: bool,
    pub event_since: Option<DateTime<Utc>>,
    pub event_until: Option<DateTime<Utc>>,
    pub after_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ReportStats {
    pub total_reports: usize,
    pub with_coordinates: usize,
    pub by_status: Vec<(String, usize)>,
    pub by_category: Vec<(String, usize)>,
}

pub trait ReportRepository: Send + Sync {
    fn add(&self, report: &Report) -> Result<(), DomainError>;
    fn get_by_id(&self, id: &str) -> Result<Option<Report>, DomainError>;
    fn query(&self, filter: &ReportFilter) -> Result<Vec<Report>, DomainError>;
    /// Approved reports with a location string but no coordinates, in id order.
    fn missing_coordinates(&self, limit: usize) -> Result<Vec<Report>, DomainError>;
    fn set_coordinates(&self, id: &str, coordinates: &Coordinates) -> Result<(), DomainError>;
    fn stats(&self) -> Result<ReportStats, DomainError>;
}
