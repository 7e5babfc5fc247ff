//! Shared test helpers.
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use openanomaly::domain::entities::report::{Report, ReportStatus};
use openanomaly::domain::ports::checkpoint_repository::CheckpointRepository;
use openanomaly::domain::ports::pattern_repository::PatternRepository;
use openanomaly::domain::ports::report_repository::ReportRepository;
use openanomaly::domain::values::category::Category;
use openanomaly::domain::values::credibility::Credibility;
use openanomaly::domain::values::geo::Coordinates;
use openanomaly::infrastructure::geocode::noop::NoopGeocoder;
use openanomaly::infrastructure::narrative::template::TemplateNarrative;
use openanomaly::infrastructure::sqlite::checkpoint_repo::SqliteCheckpointRepo;
use openanomaly::infrastructure::sqlite::migrations::run_migrations;
use openanomaly::infrastructure::sqlite::pattern_repo::SqlitePatternRepo;
use openanomaly::infrastructure::sqlite::report_repo::SqliteReportRepo;
use openanomaly::OpenAnomaly;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub fn setup() -> OpenAnomaly {
    OpenAnomaly::with_providers(":memory:", Arc::new(NoopGeocoder), Arc::new(TemplateNarrative))
        .unwrap()
}

pub struct TestRepos {
    pub reports: Arc<dyn ReportRepository>,
    pub patterns: Arc<dyn PatternRepository>,
    pub checkpoints: Arc<dyn CheckpointRepository>,
}

/// Raw repositories over one in-memory database, for tests that need to
/// drive the use cases with a fixed clock.
pub fn repos() -> TestRepos {
    let conn = Connection::open(":memory:").unwrap();
    run_migrations(&conn).unwrap();
    let conn = Arc::new(Mutex::new(conn));
    TestRepos {
        reports: Arc::new(SqliteReportRepo::new(conn.clone())),
        patterns: Arc::new(SqlitePatternRepo::new(conn.clone())),
        checkpoints: Arc::new(SqliteCheckpointRepo::new(conn)),
    }
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn days_ago(n: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(n)
}

/// Ingestion input strong enough to clear the approval threshold.
pub fn rich_new_report(
    title: &str,
    category: Category,
    lat: f64,
    lng: f64,
    event_date: DateTime<Utc>,
) -> openanomaly::application::ingest::NewReport {
    openanomaly::application::ingest::NewReport {
        category,
        title: title.to_string(),
        description: "I observed a metallic disc approximately 20 meters across hovering \
            near the highway for three minutes. It changed direction twice and left a \
            trace of residue on the field below. Multiple people stopped their cars; \
            an off-duty police officer also reported it. The sighting lasted about four \
            minutes and was captured on a dashboard recording."
            .to_string(),
        coordinates: Some(Coordinates::new(lat, lng).unwrap()),
        location_text: Some("Route 9, north of Peekskill".to_string()),
        event_date: Some(event_date),
        physical_evidence: true,
        photo_video: true,
        official_report: true,
        credibility: Credibility::Verified,
        tags: vec!["news".to_string(), "disc".to_string()],
        witness_count: Some(5),
        metadata: None,
    }
}

/// An already-approved report with coordinates, bypassing ingestion scoring.
pub fn approved_report(
    title: &str,
    category: Category,
    lat: f64,
    lng: f64,
    event_date: DateTime<Utc>,
) -> Report {
    let mut report = Report::new(
        category,
        title.to_string(),
        "Bright object moving silently over the treeline for several minutes.".to_string(),
        Some(Coordinates::new(lat, lng).unwrap()),
        None,
        Some(event_date),
        Credibility::Unverified,
        vec![],
        None,
    );
    report.status = ReportStatus::Approved;
    report
}
