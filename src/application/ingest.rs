use crate::domain::entities::report::{Report, ReportStatus};
use crate::domain::error::DomainError;
use crate::domain::ports::report_repository::ReportRepository;
use crate::domain::values::category::Category;
use crate::domain::values::credibility::Credibility;
use crate::domain::values::geo::Coordinates;
use crate::domain::values::quality::{score, QualityReport, RecommendedStatus};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct NewReport {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub coordinates: Option<Coordinates>,
    pub location_text: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub physical_evidence: bool,
    pub photo_video: bool,
    pub official_report: bool,
    pub credibility: Credibility,
    pub tags: Vec<String>,
    pub witness_count: Option<u32>,
    pub metadata: Option<serde_json::Value>,
}

pub struct AddReportUseCase {
    reports: Arc<dyn ReportRepository>,
}

impl AddReportUseCase {
    pub fn new(reports: Arc<dyn ReportRepository>) -> Self {
        Self { reports }
    }

    /// Store a new report with its moderation status taken from the quality
    /// score, so low-effort submissions never reach the clustering core.
    pub fn execute(&self, input: NewReport) -> Result<(Report, QualityReport), DomainError> {
        let mut report = Report::new(
            input.category,
            input.title,
            input.description,
            input.coordinates,
            input.location_text,
            input.event_date,
            input.credibility,
            input.tags,
            input.metadata,
        );
        report.physical_evidence = input.physical_evidence;
        report.photo_video = input.photo_video;
        report.official_report = input.official_report;
        report.witness_count = input.witness_count;

        let quality = score(&report.scoring_input());
        report.status = match quality.recommended_status {
            RecommendedStatus::Approved => ReportStatus::Approved,
            RecommendedStatus::PendingReview => ReportStatus::PendingReview,
            RecommendedStatus::Rejected => ReportStatus::Rejected,
        };

        self.reports.add(&report)?;
        Ok((report, quality))
    }
}
