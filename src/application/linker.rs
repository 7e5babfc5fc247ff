use crate::domain::entities::pattern::{Pattern, PatternReportLink, PatternStatus};
use crate::domain::entities::report::ReportStatus;
use crate::domain::error::DomainError;
use crate::domain::ports::pattern_repository::PatternRepository;
use crate::domain::ports::report_repository::{ReportFilter, ReportRepository};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Relevance assigned to reports pulled in by criteria match rather than by
/// the spatial sweep itself.
pub const DEFAULT_LINK_RELEVANCE: f64 = 0.8;

/// Reports slightly outside the observed date span can still belong to a
/// growing pattern.
const DATE_WINDOW_SLACK_DAYS: i64 = 30;

/// A pattern younger than this that is still gaining reports stays emerging.
const GROWTH_EMERGING_DAYS: i64 = 14;

pub struct IncrementalLinker {
    reports: Arc<dyn ReportRepository>,
    patterns: Arc<dyn PatternRepository>,
}

#[derive(Debug, Serialize)]
pub struct LinkSweep {
    pub patterns_scanned: usize,
    pub links_added: usize,
    pub errors: Vec<String>,
}

impl IncrementalLinker {
    pub fn new(reports: Arc<dyn ReportRepository>, patterns: Arc<dyn PatternRepository>) -> Self {
        Self { reports, patterns }
    }

    /// Attach newly approved matching reports to live patterns using the
    /// pattern's defining criteria (category set, date window) without
    /// redoing spatial clustering. Idempotent: a second run with no new
    /// qualifying reports adds zero links.
    pub fn run(&self, now: DateTime<Utc>) -> Result<LinkSweep, DomainError> {
        let mut scanned = 0;
        let mut links_added = 0;
        let mut errors = Vec::new();

        for status in [
            PatternStatus::Emerging,
            PatternStatus::Active,
            PatternStatus::Declining,
        ] {
            for pattern in self.patterns.list(Some(status), None)? {
                scanned += 1;
                match self.link_pattern(&pattern, now) {
                    Ok(added) => links_added += added,
                    Err(e) => errors.push(format!("Failed to link pattern {}: {e}", pattern.id)),
                }
            }
        }

        Ok(LinkSweep {
            patterns_scanned: scanned,
            links_added,
            errors,
        })
    }

    fn link_pattern(&self, pattern: &Pattern, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let slack = Duration::days(DATE_WINDOW_SLACK_DAYS);
        let candidates = self.reports.query(&ReportFilter {
            status: Some(ReportStatus::Approved),
            categories: Some(pattern.categories.clone()),
            event_since: pattern.first_report_date.map(|d| d - slack),
            event_until: pattern.last_report_date.map(|d| d + slack),
            ..Default::default()
        })?;

        let already_linked = self.patterns.linked_report_ids(&pattern.id)?;
        let new_links: Vec<PatternReportLink> = candidates
            .iter()
            .filter(|r| !already_linked.contains(&r.id))
            .map(|r| PatternReportLink {
                pattern_id: pattern.id.clone(),
                report_id: r.id.clone(),
                relevance_score: DEFAULT_LINK_RELEVANCE,
                distance_km: r.coordinates.map(|c| c.distance_km(&pattern.centroid)),
            })
            .collect();

        if new_links.is_empty() {
            return Ok(0);
        }
        let added = self.patterns.link_reports(&new_links)?;
        if added == 0 {
            return Ok(0);
        }

        let mut pattern = pattern.clone();
        pattern.report_count = self.patterns.link_count(&pattern.id)?;
        let latest_event = candidates.iter().filter_map(|r| r.event_date).max();
        pattern.last_report_date = match (pattern.last_report_date, latest_event) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        // Growth overrides the staleness table: a genuinely growing pattern
        // must not be demoted just because its row sat untouched.
        let age_days = (now - pattern.first_detected_at).num_days();
        pattern.status = if age_days < GROWTH_EMERGING_DAYS {
            PatternStatus::Emerging
        } else {
            PatternStatus::Active
        };
        pattern.last_updated_at = now;
        self.patterns.update(&pattern)?;

        Ok(added)
    }
}
