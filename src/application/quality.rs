use crate::domain::error::DomainError;
use crate::domain::ports::report_repository::ReportRepository;
use crate::domain::values::quality::{score, QualityReport, ScoringInput};
use std::sync::Arc;

pub struct QualityUseCase {
    reports: Arc<dyn ReportRepository>,
}

impl QualityUseCase {
    pub fn new(reports: Arc<dyn ReportRepository>) -> Self {
        Self { reports }
    }

    pub fn score_report(&self, id: &str) -> Result<QualityReport, DomainError> {
        let report = self
            .reports
            .get_by_id(id)?
            .ok_or_else(|| DomainError::NotFound(format!("report {id}")))?;
        Ok(score(&report.scoring_input()))
    }

    /// Score a draft that was never persisted.
    pub fn score_input(&self, input: &ScoringInput) -> QualityReport {
        score(input)
    }
}
