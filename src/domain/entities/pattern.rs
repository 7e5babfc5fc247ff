use crate::domain::values::category::Category;
use crate::domain::values::cluster::Cluster;
use crate::domain::values::geo::Coordinates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    GeographicCluster,
    TemporalAnomaly,
    FlapWave,
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternType::GeographicCluster => write!(f, "geographic_cluster"),
            PatternType::TemporalAnomaly => write!(f, "temporal_anomaly"),
            PatternType::FlapWave => write!(f, "flap_wave"),
        }
    }
}

impl FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geographic_cluster" => Ok(PatternType::GeographicCluster),
            "temporal_anomaly" => Ok(PatternType::TemporalAnomaly),
            "flap_wave" => Ok(PatternType::FlapWave),
            _ => Err(format!("Unknown pattern type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternStatus {
    Emerging,
    Active,
    Declining,
    Historical,
    Archived,
}

impl fmt::Display for PatternStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternStatus::Emerging => write!(f, "emerging"),
            PatternStatus::Active => write!(f, "active"),
            PatternStatus::Declining => write!(f, "declining"),
            PatternStatus::Historical => write!(f, "historical"),
            PatternStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for PatternStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emerging" => Ok(PatternStatus::Emerging),
            "active" => Ok(PatternStatus::Active),
            "declining" => Ok(PatternStatus::Declining),
            "historical" => Ok(PatternStatus::Historical),
            "archived" => Ok(PatternStatus::Archived),
            _ => Err(format!("Unknown pattern status: {s}")),
        }
    }
}

/// Staleness state machine. Evaluated for every non-archived pattern on every
/// lifecycle pass; `archived` is terminal and never assigned here.
pub fn status_for_staleness(days_since_update: i64) -> PatternStatus {
    if days_since_update < 7 {
        PatternStatus::Emerging
    } else if days_since_update < 30 {
        PatternStatus::Active
    } else if days_since_update < 90 {
        PatternStatus::Declining
    } else {
        PatternStatus::Historical
    }
}

/// Pattern confidence from its evidence mix. Grows slowly with report count,
/// with a fixed bump when any member is verified.
pub fn confidence_for(report_count: usize, has_verified: bool) -> f64 {
    let base = 0.4 + 0.05 * (report_count as f64).sqrt();
    let bump = if has_verified { 0.15 } else { 0.0 };
    (base + bump).min(0.95)
}

/// The persisted, long-lived entity a [`Cluster`] is reconciled into.
/// Survives across runs; never physically deleted, only transitioned to
/// `archived`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub pattern_type: PatternType,
    pub status: PatternStatus,
    pub title: String,
    pub significance_score: f64,
    pub confidence_score: f64,
    pub report_count: usize,
    pub centroid: Coordinates,
    pub radius_km: f64,
    pub categories: Vec<Category>,
    pub first_report_date: Option<DateTime<Utc>>,
    pub last_report_date: Option<DateTime<Utc>>,
    pub detection_method: String,
    pub metadata: Option<serde_json::Value>,
    pub first_detected_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl Pattern {
    /// Create a new pattern from a freshly discovered cluster.
    pub fn from_cluster(cluster: &Cluster, radius_km: f64, has_verified: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pattern_type: PatternType::GeographicCluster,
            status: PatternStatus::Emerging,
            title: generate_title(cluster.primary_category, cluster.report_count()),
            significance_score: cluster.intensity / 100.0,
            confidence_score: confidence_for(cluster.report_count(), has_verified),
            report_count: cluster.report_count(),
            centroid: cluster.centroid,
            radius_km,
            categories: cluster.categories(),
            first_report_date: cluster.first_event,
            last_report_date: cluster.last_event,
            detection_method: "clustering".to_string(),
            metadata: None,
            first_detected_at: now,
            last_updated_at: now,
        }
    }

    /// Natural key cell for upserts: centroid rounded to 0.1 degree, matching
    /// the merge tolerance so overlapping cron fires land on the same row.
    pub fn centroid_cell(&self) -> String {
        centroid_cell(&self.centroid)
    }
}

pub fn centroid_cell(centroid: &Coordinates) -> String {
    format!("{:.1}:{:.1}", centroid.lat, centroid.lng)
}

pub fn generate_title(primary_category: Category, report_count: usize) -> String {
    let label = match primary_category {
        Category::Ufo => "UFO",
        Category::Ghost => "Ghost",
        Category::Cryptid => "Cryptid",
        Category::Psychic => "Psychic",
        Category::Possession => "Possession",
        Category::Other => "Unclassified",
    };
    format!("{label} activity hotspot ({report_count} reports)")
}

/// A single pattern-to-report membership with its relevance and distance.
#[derive(Debug, Clone, Serialize)]
pub struct PatternReportLink {
    pub pattern_id: String,
    pub report_id: String,
    pub relevance_score: f64,
    pub distance_km: Option<f64>,
}
