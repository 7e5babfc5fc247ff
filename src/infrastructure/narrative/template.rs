use crate::domain::entities::pattern::Pattern;
use crate::domain::error::DomainError;
use crate::domain::ports::narrative::NarrativeGenerator;

/// Deterministic fallback narrative built from the pattern's own fields.
/// Stands in for the external prose-generation collaborator.
pub struct TemplateNarrative;

#[async_trait::async_trait]
impl NarrativeGenerator for TemplateNarrative {
    async fn narrate(&self, pattern: &Pattern) -> Result<String, DomainError> {
        let categories: Vec<String> = pattern.categories.iter().map(|c| c.to_string()).collect();
        let span = match (pattern.first_report_date, pattern.last_report_date) {
            (Some(first), Some(last)) => format!(
                " between {} and {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            ),
            _ => String::new(),
        };
        Ok(format!(
            "{}: {} reports ({}) within roughly {:.0} km of {}{}. Status: {}.",
            pattern.title,
            pattern.report_count,
            categories.join(", "),
            pattern.radius_km,
            pattern.centroid,
            span,
            pattern.status,
        ))
    }

    fn name(&self) -> &'static str {
        "template"
    }
}
