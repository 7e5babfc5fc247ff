use crate::domain::values::category::Category;
use crate::domain::values::geo::Coordinates;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Days of inactivity after which a cluster is no longer considered active.
pub const ACTIVE_WINDOW_DAYS: i64 = 90;

/// A report that joined a cluster, with the coordinates it joined on.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterMember {
    pub report_id: String,
    pub coordinates: Coordinates,
}

/// A transient spatial grouping discovered in one clustering pass. Clusters
/// are never persisted directly; they are reconciled into [`Pattern`]s.
///
/// [`Pattern`]: crate::domain::entities::pattern::Pattern
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub members: Vec<ClusterMember>,
    pub centroid: Coordinates,
    /// Count per category, in canonical category order.
    pub category_counts: Vec<(Category, usize)>,
    /// Mode of member categories; ties break on canonical category order.
    pub primary_category: Category,
    pub first_event: Option<DateTime<Utc>>,
    pub last_event: Option<DateTime<Utc>>,
    /// Most recent member event within the last 90 days of the sweep's `now`.
    pub is_active: bool,
    /// Any member carries a verified credibility label.
    pub has_verified: bool,
    /// 0-100 composite of density, recency and verification strength.
    pub intensity: f64,
}

impl Cluster {
    pub fn report_count(&self) -> usize {
        self.members.len()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.category_counts.iter().map(|(c, _)| *c).collect()
    }
}

/// Intensity formula. Reproduced exactly for interop with downstream
/// consumers of the score:
///
/// `min(100, base + recency + verification)` where
/// `base = min(50, log10(n + 1) * 25)`, recency steps down with the age of
/// the cluster's first report, and verification adds 20 when any member is
/// verified.
pub fn intensity(report_count: usize, days_active: i64, has_verified: bool) -> f64 {
    let base = (((report_count as f64) + 1.0).log10() * 25.0).min(50.0);
    let recency = if days_active <= 30 {
        30.0
    } else if days_active <= 90 {
        20.0
    } else if days_active <= 365 {
        10.0
    } else {
        5.0
    };
    let verification = if has_verified { 20.0 } else { 0.0 };
    (base + recency + verification).min(100.0)
}
