//! The scheduled detection pipeline: scan, cluster, reconcile, link,
//! lifecycle, guard — strictly in that order, since each sweep depends on the
//! previous one's effects.

use crate::application::artifact_guard::ArtifactGuard;
use crate::application::clustering::{cluster_reports, ClusterOptions};
use crate::application::lifecycle::LifecycleManager;
use crate::application::linker::IncrementalLinker;
use crate::application::registry::PatternRegistry;
use crate::application::retry::with_retry;
use crate::domain::entities::report::{Report, ReportStatus};
use crate::domain::error::DomainError;
use crate::domain::ports::checkpoint_repository::{CheckpointRepository, RunCheckpoint};
use crate::domain::ports::report_repository::{ReportFilter, ReportRepository};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const DETECT_JOB: &str = "detect";

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub struct DetectOptions {
    pub radius_km: f64,
    pub min_members: usize,
    pub page_size: usize,
    /// Wall-clock budget for the scan phase. When exceeded, the cursor is
    /// checkpointed and the run finishes with what it has; the next
    /// invocation resumes instead of restarting.
    pub budget: Option<Duration>,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            radius_km: 50.0,
            min_members: 3,
            page_size: 500,
            budget: None,
        }
    }
}

/// Per-invocation operational summary, printed as JSON for logging and
/// alerting.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Reports scanned this invocation.
    pub processed: usize,
    /// Clusters merged into existing patterns.
    pub matched: usize,
    /// New patterns inserted.
    pub inserted: usize,
    /// Links added, by the reconciliation and the incremental sweep combined.
    pub linked: usize,
    /// Scanned reports that stayed unclustered.
    pub skipped: usize,
    /// Patterns archived by the ingestion-artifact guard.
    pub archived: usize,
    /// True when the scan picked up from a previous checkpoint.
    pub resumed: bool,
    /// False when the budget ran out and a checkpoint was left behind.
    pub completed: bool,
    pub errors: Vec<String>,
}

pub struct DetectionPipeline {
    reports: Arc<dyn ReportRepository>,
    checkpoints: Arc<dyn CheckpointRepository>,
    registry: PatternRegistry,
    linker: IncrementalLinker,
    lifecycle: LifecycleManager,
    guard: ArtifactGuard,
}

impl DetectionPipeline {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        checkpoints: Arc<dyn CheckpointRepository>,
        registry: PatternRegistry,
        linker: IncrementalLinker,
        lifecycle: LifecycleManager,
        guard: ArtifactGuard,
    ) -> Self {
        Self {
            reports,
            checkpoints,
            registry,
            linker,
            lifecycle,
            guard,
        }
    }

    pub fn run(&self, options: &DetectOptions, now: DateTime<Utc>) -> Result<RunSummary, DomainError> {
        let started = std::time::Instant::now();
        let mut errors = Vec::new();

        let checkpoint = self.checkpoints.load(DETECT_JOB)?;
        let resumed = checkpoint.is_some();
        let mut cursor = checkpoint.as_ref().map(|c| c.cursor.clone());
        let mut processed = checkpoint.map_or(0, |c| c.processed);
        let mut completed = true;

        // Scan phase: page unassigned, located, approved reports in id order.
        let mut buffer: Vec<Report> = Vec::new();
        loop {
            let filter = ReportFilter {
                status: Some(ReportStatus::Approved),
                with_coordinates: true,
                unassigned_only: true,
                after_id: cursor.clone(),
                limit: Some(options.page_size),
                ..Default::default()
            };
            let page = match with_retry(RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
                self.reports.query(&filter)
            }) {
                Ok(page) => page,
                Err(e) => {
                    errors.push(format!("Report scan failed after retries: {e}"));
                    completed = false;
                    break;
                }
            };
            if page.is_empty() {
                break;
            }
            cursor = page.last().map(|r| r.id.clone());
            processed += page.len();
            buffer.extend(page);

            if options.budget.is_some_and(|b| started.elapsed() >= b) {
                completed = false;
                break;
            }
        }

        // Clustering + reconciliation over whatever the scan gathered.
        let cluster_opts = ClusterOptions {
            radius_km: options.radius_km,
            min_members: options.min_members,
        };
        let clusters = cluster_reports(&buffer, &cluster_opts, now);
        let clustered: usize = clusters.iter().map(|c| c.report_count()).sum();
        let mut skipped = buffer.len().saturating_sub(clustered);

        let mut matched = 0;
        let mut inserted = 0;
        let mut linked = 0;
        for cluster in &clusters {
            match self.registry.reconcile(cluster, options.radius_km, now) {
                Ok(Some(outcome)) => {
                    if outcome.merged {
                        matched += 1;
                    } else {
                        inserted += 1;
                    }
                    linked += outcome.links_added;
                }
                // Cluster landed on an archived pattern's cell; its members
                // stay unassigned.
                Ok(None) => skipped += cluster.report_count(),
                Err(e) => errors.push(format!("Reconcile failed: {e}")),
            }
        }

        if completed {
            self.checkpoints.clear(DETECT_JOB)?;
        } else if let Some(cursor) = cursor {
            self.checkpoints.save(&RunCheckpoint {
                job: DETECT_JOB.to_string(),
                cursor,
                processed,
                updated_at: now,
            })?;
        }

        // Downstream sweeps run even on a budget-cut scan: they only act on
        // state already persisted above.
        match self.linker.run(now) {
            Ok(sweep) => {
                linked += sweep.links_added;
                errors.extend(sweep.errors);
            }
            Err(e) => errors.push(format!("Link sweep failed: {e}")),
        }
        match self.lifecycle.run(now) {
            Ok(sweep) => errors.extend(sweep.errors),
            Err(e) => errors.push(format!("Lifecycle sweep failed: {e}")),
        }
        let mut archived = 0;
        match self.guard.run(now) {
            Ok(sweep) => {
                archived = sweep.archived.len();
                errors.extend(sweep.errors);
            }
            Err(e) => errors.push(format!("Artifact guard failed: {e}")),
        }

        Ok(RunSummary {
            processed,
            matched,
            inserted,
            linked,
            skipped,
            archived,
            resumed,
            completed,
            errors,
        })
    }
}
