use crate::domain::values::category::Category;
use crate::domain::values::credibility::Credibility;
use crate::domain::values::geo::Coordinates;
use crate::domain::values::quality::ScoringInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Approved,
    PendingReview,
    Rejected,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Approved => write!(f, "approved"),
            ReportStatus::PendingReview => write!(f, "pending_review"),
            ReportStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(ReportStatus::Approved),
            "pending_review" => Ok(ReportStatus::PendingReview),
            "rejected" => Ok(ReportStatus::Rejected),
            _ => Err(format!("Unknown report status: {s}")),
        }
    }
}

/// A user-submitted phenomenon report. Owned by the ingestion/moderation
/// subsystem; the clustering core only reads approved reports that carry
/// coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub coordinates: Option<Coordinates>,
    pub location_text: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub physical_evidence: bool,
    pub photo_video: bool,
    pub official_report: bool,
    pub credibility: Credibility,
    pub tags: Vec<String>,
    pub witness_count: Option<u32>,
    pub status: ReportStatus,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        category: Category,
        title: String,
        description: String,
        coordinates: Option<Coordinates>,
        location_text: Option<String>,
        event_date: Option<DateTime<Utc>>,
        credibility: Credibility,
        tags: Vec<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description,
            category,
            coordinates,
            location_text,
            event_date,
            physical_evidence: false,
            photo_video: false,
            official_report: false,
            credibility,
            tags,
            witness_count: None,
            status: ReportStatus::Approved,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn scoring_input(&self) -> ScoringInput {
        ScoringInput {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            coordinates: self.coordinates,
            location_text: self.location_text.clone(),
            event_date: self.event_date,
            physical_evidence: self.physical_evidence,
            photo_video: self.photo_video,
            official_report: self.official_report,
            credibility: self.credibility,
            tags: self.tags.clone(),
            witness_count: self.witness_count,
        }
    }
}
