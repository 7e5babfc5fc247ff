use crate::domain::entities::pattern::{Pattern, PatternStatus, PatternType};
use crate::domain::error::DomainError;
use crate::domain::ports::narrative::NarrativeGenerator;
use crate::domain::ports::pattern_repository::PatternRepository;
use crate::domain::values::category::Category;
use crate::domain::values::geo::Coordinates;
use crate::domain::values::uncertainty::{ConfidenceLabel, UncertaintyBounds};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Outward-facing pattern record: raw scores are wrapped in uncertainty
/// bounds before anything is displayed.
#[derive(Debug, Serialize)]
pub struct PatternView {
    pub id: String,
    pub pattern_type: PatternType,
    pub status: PatternStatus,
    pub title: String,
    pub significance: UncertaintyBounds,
    pub significance_label: ConfidenceLabel,
    pub confidence: UncertaintyBounds,
    pub confidence_label: ConfidenceLabel,
    pub report_count: usize,
    pub categories: Vec<Category>,
    pub centroid: Coordinates,
    pub radius_km: f64,
    pub first_report_date: Option<DateTime<Utc>>,
    pub last_report_date: Option<DateTime<Utc>>,
    pub narrative: Option<String>,
    pub first_detected_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

pub struct PatternQueryUseCase {
    patterns: Arc<dyn PatternRepository>,
    narrative: Arc<dyn NarrativeGenerator>,
}

impl PatternQueryUseCase {
    pub fn new(patterns: Arc<dyn PatternRepository>, narrative: Arc<dyn NarrativeGenerator>) -> Self {
        Self { patterns, narrative }
    }

    pub fn list(
        &self,
        status: Option<PatternStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Pattern>, DomainError> {
        self.patterns.list(status, limit)
    }

    pub async fn view(&self, id: &str) -> Result<PatternView, DomainError> {
        let pattern = self
            .patterns
            .get_by_id(id)?
            .ok_or_else(|| DomainError::NotFound(format!("pattern {id}")))?;

        // Narrative generation is advisory; failure must not hide the pattern.
        let narrative = match self.narrative.narrate(&pattern).await {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                eprintln!("Warning: narrative generation failed for {id}: {e}");
                None
            }
        };

        Ok(Self::to_view(pattern, narrative))
    }

    fn to_view(pattern: Pattern, narrative: Option<String>) -> PatternView {
        let significance = UncertaintyBounds::around(pattern.significance_score, pattern.report_count);
        let confidence = UncertaintyBounds::around(pattern.confidence_score, pattern.report_count);
        PatternView {
            id: pattern.id,
            pattern_type: pattern.pattern_type,
            status: pattern.status,
            title: pattern.title,
            significance_label: significance.label(),
            significance,
            confidence_label: confidence.label(),
            confidence,
            report_count: pattern.report_count,
            categories: pattern.categories,
            centroid: pattern.centroid,
            radius_km: pattern.radius_km,
            first_report_date: pattern.first_report_date,
            last_report_date: pattern.last_report_date,
            narrative,
            first_detected_at: pattern.first_detected_at,
            last_updated_at: pattern.last_updated_at,
        }
    }
}
