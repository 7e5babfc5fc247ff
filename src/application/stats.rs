use crate::domain::error::DomainError;
use crate::domain::ports::pattern_repository::{PatternRepository, PatternStats};
use crate::domain::ports::report_repository::{ReportRepository, ReportStats};
use serde::Serialize;
use std::sync::Arc;

pub struct StatsUseCase {
    reports: Arc<dyn ReportRepository>,
    patterns: Arc<dyn PatternRepository>,
}

#[derive(Debug, Serialize)]
pub struct EngineStats {
    pub reports: ReportStats,
    pub patterns: PatternStats,
}

impl StatsUseCase {
    pub fn new(reports: Arc<dyn ReportRepository>, patterns: Arc<dyn PatternRepository>) -> Self {
        Self { reports, patterns }
    }

    pub fn stats(&self) -> Result<EngineStats, DomainError> {
        Ok(EngineStats {
            reports: self.reports.stats()?,
            patterns: self.patterns.stats()?,
        })
    }
}
