use crate::domain::entities::pattern::{
    centroid_cell, confidence_for, generate_title, status_for_staleness, Pattern,
    PatternReportLink, PatternStatus, PatternType,
};
use crate::domain::error::DomainError;
use crate::domain::ports::pattern_repository::PatternRepository;
use crate::domain::values::cluster::Cluster;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Merge tolerance around an existing pattern's centroid, in degrees.
/// 0.1 degree is roughly an 11 km box at mid latitudes.
pub const MERGE_TOLERANCE_DEG: f64 = 0.1;

/// Relevance assigned to members linked through the clustering pass itself.
const CLUSTER_MEMBER_RELEVANCE: f64 = 1.0;

pub struct PatternRegistry {
    patterns: Arc<dyn PatternRepository>,
}

#[derive(Debug, Serialize)]
pub struct ReconcileOutcome {
    pub pattern_id: String,
    /// True when the cluster merged into an existing pattern.
    pub merged: bool,
    pub links_added: usize,
}

impl PatternRegistry {
    pub fn new(patterns: Arc<dyn PatternRepository>) -> Self {
        Self { patterns }
    }

    /// Reconcile one candidate cluster into the registry: merge into the
    /// nearest existing pattern within the merge box, or insert a new one.
    /// Every write is an upsert on a natural key, so re-running the same
    /// candidate is a no-op rather than a duplicate.
    ///
    /// Archived patterns are terminal. They are never merge targets, and a
    /// cluster landing on an archived row's natural key is dropped entirely
    /// (returns `None`) rather than resurrecting the row through the upsert.
    pub fn reconcile(&self, cluster: &Cluster, radius_km: f64, now: DateTime<Utc>) -> Result<Option<ReconcileOutcome>, DomainError> {
        let nearby = self.patterns.find_near(
            &cluster.centroid,
            MERGE_TOLERANCE_DEG,
            PatternType::GeographicCluster,
        )?;

        let cell = centroid_cell(&cluster.centroid);
        if nearby
            .iter()
            .any(|p| p.status == PatternStatus::Archived && p.centroid_cell() == cell)
        {
            return Ok(None);
        }

        // Nearest centroid wins. The candidate list is id-ordered and min_by
        // keeps the first minimum, so exact ties break on smallest id.
        let nearest = nearby
            .into_iter()
            .filter(|p| p.status != PatternStatus::Archived)
            .min_by(|a, b| {
                let da = a.centroid.distance_km(&cluster.centroid);
                let db = b.centroid.distance_km(&cluster.centroid);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });

        match nearest {
            Some(pattern) => self.merge(pattern, cluster, now).map(Some),
            None => self.insert(cluster, radius_km, now).map(Some),
        }
    }

    fn merge(&self, mut pattern: Pattern, cluster: &Cluster, now: DateTime<Utc>) -> Result<ReconcileOutcome, DomainError> {
        let already_linked = self.patterns.linked_report_ids(&pattern.id)?;
        let new_links: Vec<PatternReportLink> = cluster
            .members
            .iter()
            .filter(|m| !already_linked.contains(&m.report_id))
            .map(|m| PatternReportLink {
                pattern_id: pattern.id.clone(),
                report_id: m.report_id.clone(),
                relevance_score: CLUSTER_MEMBER_RELEVANCE,
                distance_km: Some(m.coordinates.distance_km(&pattern.centroid)),
            })
            .collect();
        let links_added = if new_links.is_empty() {
            0
        } else {
            self.patterns.link_reports(&new_links)?
        };

        for category in cluster.categories() {
            if !pattern.categories.contains(&category) {
                pattern.categories.push(category);
            }
        }
        pattern.report_count = self.patterns.link_count(&pattern.id)?;
        pattern.title = generate_title(cluster.primary_category, pattern.report_count);
        pattern.first_report_date = match (pattern.first_report_date, cluster.first_event) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        pattern.last_report_date = match (pattern.last_report_date, cluster.last_event) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        pattern.significance_score = cluster.intensity / 100.0;
        pattern.confidence_score = confidence_for(pattern.report_count, cluster.has_verified);
        let days_stale = (now - pattern.last_updated_at).num_days();
        pattern.status = status_for_staleness(days_stale);
        pattern.last_updated_at = now;

        self.patterns.update(&pattern)?;
        Ok(ReconcileOutcome {
            pattern_id: pattern.id,
            merged: true,
            links_added,
        })
    }

    fn insert(&self, cluster: &Cluster, radius_km: f64, now: DateTime<Utc>) -> Result<ReconcileOutcome, DomainError> {
        let pattern = Pattern::from_cluster(cluster, radius_km, cluster.has_verified, now);
        // The stored id can differ from the fresh one if a concurrent
        // invocation inserted the same centroid cell first.
        let pattern_id = self.patterns.upsert(&pattern)?;

        let already_linked = self.patterns.linked_report_ids(&pattern_id)?;
        let links: Vec<PatternReportLink> = cluster
            .members
            .iter()
            .filter(|m| !already_linked.contains(&m.report_id))
            .map(|m| PatternReportLink {
                pattern_id: pattern_id.clone(),
                report_id: m.report_id.clone(),
                relevance_score: CLUSTER_MEMBER_RELEVANCE,
                distance_km: Some(m.coordinates.distance_km(&cluster.centroid)),
            })
            .collect();
        let links_added = self.patterns.link_reports(&links)?;

        Ok(ReconcileOutcome {
            pattern_id,
            merged: false,
            links_added,
        })
    }
}
