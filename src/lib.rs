pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::artifact_guard::{ArtifactGuard, GuardSweep};
use crate::application::detect::{DetectOptions, DetectionPipeline, RunSummary};
use crate::application::geocode_backfill::{BackfillReport, GeocodeBackfillUseCase};
use crate::application::ingest::{AddReportUseCase, NewReport};
use crate::application::lifecycle::{LifecycleManager, LifecycleSweep};
use crate::application::linker::{IncrementalLinker, LinkSweep};
use crate::application::patterns::{PatternQueryUseCase, PatternView};
use crate::application::quality::QualityUseCase;
use crate::application::registry::PatternRegistry;
use crate::application::stats::{EngineStats, StatsUseCase};
use crate::domain::entities::pattern::{Pattern, PatternStatus};
use crate::domain::entities::report::Report;
use crate::domain::error::DomainError;
use crate::domain::ports::checkpoint_repository::CheckpointRepository;
use crate::domain::ports::geocoder::Geocoder;
use crate::domain::ports::narrative::NarrativeGenerator;
use crate::domain::ports::pattern_repository::PatternRepository;
use crate::domain::ports::report_repository::ReportRepository;
use crate::domain::values::quality::{QualityReport, ScoringInput};
use crate::infrastructure::geocode::nominatim::NominatimGeocoder;
use crate::infrastructure::geocode::noop::NoopGeocoder;
use crate::infrastructure::narrative::noop::NoopNarrative;
use crate::infrastructure::narrative::template::TemplateNarrative;
use crate::infrastructure::sqlite::checkpoint_repo::SqliteCheckpointRepo;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::pattern_repo::SqlitePatternRepo;
use crate::infrastructure::sqlite::report_repo::SqliteReportRepo;
use chrono::Utc;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub struct OpenAnomaly {
    add_report_uc: AddReportUseCase,
    quality_uc: QualityUseCase,
    pipeline: DetectionPipeline,
    linker: IncrementalLinker,
    lifecycle: LifecycleManager,
    guard: ArtifactGuard,
    patterns_uc: PatternQueryUseCase,
    backfill_uc: GeocodeBackfillUseCase,
    stats_uc: StatsUseCase,
}

impl OpenAnomaly {
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let geocoder_kind =
            std::env::var("OPENANOMALY_GEOCODER").unwrap_or_else(|_| "noop".into());
        let geocoder: Arc<dyn Geocoder> = match geocoder_kind.as_str() {
            "nominatim" => Arc::new(NominatimGeocoder::new()),
            _ => Arc::new(NoopGeocoder),
        };
        let narrative_kind =
            std::env::var("OPENANOMALY_NARRATIVE").unwrap_or_else(|_| "template".into());
        let narrative: Arc<dyn NarrativeGenerator> = match narrative_kind.as_str() {
            "noop" => Arc::new(NoopNarrative),
            _ => Arc::new(TemplateNarrative),
        };

        Self::with_providers(db_path, geocoder, narrative)
    }

    pub fn with_providers(
        db_path: &str,
        geocoder: Arc<dyn Geocoder>,
        narrative: Arc<dyn NarrativeGenerator>,
    ) -> Result<Self, DomainError> {
        // One connection shared behind a mutex, so in-memory databases work
        // and pattern upserts plus link writes observe each other.
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        run_migrations(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        let report_repo: Arc<dyn ReportRepository> = Arc::new(SqliteReportRepo::new(conn.clone()));
        let pattern_repo: Arc<dyn PatternRepository> =
            Arc::new(SqlitePatternRepo::new(conn.clone()));
        let checkpoint_repo: Arc<dyn CheckpointRepository> =
            Arc::new(SqliteCheckpointRepo::new(conn));

        let registry = PatternRegistry::new(pattern_repo.clone());
        let pipeline = DetectionPipeline::new(
            report_repo.clone(),
            checkpoint_repo,
            registry,
            IncrementalLinker::new(report_repo.clone(), pattern_repo.clone()),
            LifecycleManager::new(pattern_repo.clone()),
            ArtifactGuard::new(pattern_repo.clone()),
        );

        Ok(Self {
            add_report_uc: AddReportUseCase::new(report_repo.clone()),
            quality_uc: QualityUseCase::new(report_repo.clone()),
            pipeline,
            linker: IncrementalLinker::new(report_repo.clone(), pattern_repo.clone()),
            lifecycle: LifecycleManager::new(pattern_repo.clone()),
            guard: ArtifactGuard::new(pattern_repo.clone()),
            patterns_uc: PatternQueryUseCase::new(pattern_repo.clone(), narrative),
            backfill_uc: GeocodeBackfillUseCase::new(report_repo.clone(), geocoder),
            stats_uc: StatsUseCase::new(report_repo, pattern_repo),
        })
    }

    // Delegating methods

    pub fn add_report(&self, input: NewReport) -> Result<(Report, QualityReport), DomainError> {
        self.add_report_uc.execute(input)
    }

    pub fn score_report(&self, id: &str) -> Result<QualityReport, DomainError> {
        self.quality_uc.score_report(id)
    }

    pub fn score_input(&self, input: &ScoringInput) -> QualityReport {
        self.quality_uc.score_input(input)
    }

    pub fn detect(&self, options: &DetectOptions) -> Result<RunSummary, DomainError> {
        self.pipeline.run(options, Utc::now())
    }

    pub fn link(&self) -> Result<LinkSweep, DomainError> {
        self.linker.run(Utc::now())
    }

    pub fn lifecycle(&self) -> Result<LifecycleSweep, DomainError> {
        self.lifecycle.run(Utc::now())
    }

    pub fn guard(&self) -> Result<GuardSweep, DomainError> {
        self.guard.run(Utc::now())
    }

    pub fn patterns(
        &self,
        status: Option<PatternStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Pattern>, DomainError> {
        self.patterns_uc.list(status, limit)
    }

    pub async fn pattern_view(&self, id: &str) -> Result<PatternView, DomainError> {
        self.patterns_uc.view(id).await
    }

    pub async fn geocode_backfill(&self, limit: usize) -> Result<BackfillReport, DomainError> {
        self.backfill_uc.run(limit).await
    }

    pub fn stats(&self) -> Result<EngineStats, DomainError> {
        self.stats_uc.stats()
    }
}
