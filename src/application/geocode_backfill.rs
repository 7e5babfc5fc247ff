use crate::domain::error::DomainError;
use crate::domain::ports::geocoder::Geocoder;
use crate::domain::ports::report_repository::ReportRepository;
use serde::Serialize;
use std::sync::Arc;

pub struct GeocodeBackfillUseCase {
    reports: Arc<dyn ReportRepository>,
    geocoder: Arc<dyn Geocoder>,
}

#[derive(Debug, Serialize)]
pub struct BackfillReport {
    pub scanned: usize,
    pub geocoded: usize,
    pub unresolved: usize,
    pub errors: Vec<String>,
}

impl GeocodeBackfillUseCase {
    pub fn new(reports: Arc<dyn ReportRepository>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { reports, geocoder }
    }

    /// Resolve coordinates for approved reports that only carry a location
    /// string. The geocoder port rate-limits and caches internally, so this
    /// loop stays sequential by design.
    pub async fn run(&self, limit: usize) -> Result<BackfillReport, DomainError> {
        let candidates = self.reports.missing_coordinates(limit)?;
        let scanned = candidates.len();
        let mut geocoded = 0;
        let mut unresolved = 0;
        let mut errors = Vec::new();

        for report in &candidates {
            let Some(query) = report.location_text.as_deref() else {
                unresolved += 1;
                continue;
            };
            match self.geocoder.geocode(query).await {
                Ok(Some(coords)) => {
                    if let Err(e) = self.reports.set_coordinates(&report.id, &coords) {
                        errors.push(format!("Failed to store coordinates for {}: {e}", report.id));
                    } else {
                        geocoded += 1;
                    }
                }
                Ok(None) => unresolved += 1,
                Err(e) => errors.push(format!("Geocoding failed for {}: {e}", report.id)),
            }
        }

        Ok(BackfillReport {
            scanned,
            geocoded,
            unresolved,
            errors,
        })
    }
}
