//! Report quality scoring.
//!
//! Ten weighted dimensions, each built by summing fixed signal contributions
//! (boolean flags worth whole points, keyword hits worth fractions) and capped
//! at 10. Pure and deterministic: no clock, no randomness, no I/O, so the
//! scorer is safe to call from ingestion and from re-scoring jobs alike.

use crate::domain::values::category::Category;
use crate::domain::values::credibility::Credibility;
use crate::domain::values::geo::Coordinates;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything the scorer looks at. Derivable from a [`Report`] but kept as a
/// separate input type so callers can score drafts that were never persisted.
///
/// [`Report`]: crate::domain::entities::report::Report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringInput {
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub location_text: Option<String>,
    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub physical_evidence: bool,
    #[serde(default)]
    pub photo_video: bool,
    #[serde(default)]
    pub official_report: bool,
    #[serde(default)]
    pub credibility: Credibility,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub witness_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionScore {
    pub name: String,
    /// Raw 0-10 score before weighting.
    pub score: f64,
    pub weight: f64,
    /// `score * weight`.
    pub weighted: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::A => write!(f, "A"),
            Grade::B => write!(f, "B"),
            Grade::C => write!(f, "C"),
            Grade::D => write!(f, "D"),
            Grade::F => write!(f, "F"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedStatus {
    Approved,
    PendingReview,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub dimensions: Vec<DimensionScore>,
    /// Composite 0-100 score.
    pub composite: f64,
    pub grade: Grade,
    pub recommended_status: RecommendedStatus,
}

const WEIGHT_EVIDENCE_STRENGTH: f64 = 1.2;
const WEIGHT_WITNESS_CREDIBILITY: f64 = 1.1;
const WEIGHT_SOURCE_RELIABILITY: f64 = 1.1;
const WEIGHT_DESCRIPTION_DETAIL: f64 = 1.0;
const WEIGHT_LOCATION_SPECIFICITY: f64 = 1.0;
const WEIGHT_DATA_COMPLETENESS: f64 = 1.0;
const WEIGHT_TEMPORAL_PRECISION: f64 = 0.9;
const WEIGHT_CORROBORATION_POTENTIAL: f64 = 0.9;
const WEIGHT_NARRATIVE_COHERENCE: f64 = 0.8;
const WEIGHT_CONTENT_ORIGINALITY: f64 = 0.8;

const TOTAL_WEIGHT: f64 = WEIGHT_EVIDENCE_STRENGTH
    + WEIGHT_WITNESS_CREDIBILITY
    + WEIGHT_SOURCE_RELIABILITY
    + WEIGHT_DESCRIPTION_DETAIL
    + WEIGHT_LOCATION_SPECIFICITY
    + WEIGHT_DATA_COMPLETENESS
    + WEIGHT_TEMPORAL_PRECISION
    + WEIGHT_CORROBORATION_POTENTIAL
    + WEIGHT_NARRATIVE_COHERENCE
    + WEIGHT_CONTENT_ORIGINALITY;

const EVIDENCE_KEYWORDS: &[&str] = &["radar", "sample", "trace", "residue", "footprint", "recording"];
const CREDIBLE_WITNESS_KEYWORDS: &[&str] = &["officer", "pilot", "military", "scientist", "ranger"];
const DETAIL_KEYWORDS: &[&str] = &["approximately", "degrees", "meters", "feet", "direction", "shape", "color"];
const LOCATION_KEYWORDS: &[&str] = &["highway", "intersection", "address", "mile marker", "near the"];
const DURATION_KEYWORDS: &[&str] = &["seconds", "minutes", "lasted", "duration"];
const CORROBORATION_KEYWORDS: &[&str] = &["witnesses", "others saw", "also reported", "multiple people"];
const SECONDHAND_KEYWORDS: &[&str] = &["repost", "forwarded", "heard about", "friend of a friend"];

/// Count keyword hits in `text`, each worth `per_hit` points.
fn keyword_points(text: &str, keywords: &[&str], per_hit: f64) -> f64 {
    let lower = text.to_lowercase();
    keywords.iter().filter(|k| lower.contains(**k)).count() as f64 * per_hit
}

fn dimension(name: &str, raw: f64, weight: f64, explanation: String) -> DimensionScore {
    let score = raw.min(10.0);
    DimensionScore {
        name: name.to_string(),
        score,
        weight,
        weighted: score * weight,
        explanation,
    }
}

fn evidence_strength(input: &ScoringInput) -> DimensionScore {
    let mut raw = 0.0;
    let mut notes = Vec::new();
    if input.physical_evidence {
        raw += 4.0;
        notes.push("physical evidence");
    }
    if input.photo_video {
        raw += 3.0;
        notes.push("photo/video");
    }
    if input.official_report {
        raw += 3.0;
        notes.push("official report");
    }
    raw += keyword_points(&input.description, EVIDENCE_KEYWORDS, 0.5);
    dimension(
        "evidence_strength",
        raw,
        WEIGHT_EVIDENCE_STRENGTH,
        if notes.is_empty() {
            "No hard evidence attached".into()
        } else {
            format!("Evidence: {}", notes.join(", "))
        },
    )
}

fn witness_credibility(input: &ScoringInput) -> DimensionScore {
    let base = match input.credibility {
        Credibility::Verified => 6.0,
        Credibility::Probable => 4.0,
        Credibility::Unverified => 2.0,
        Credibility::Disputed => 0.0,
    };
    let witnesses = f64::from(input.witness_count.unwrap_or(0)).min(4.0) * 0.5;
    let raw = base + witnesses + keyword_points(&input.description, CREDIBLE_WITNESS_KEYWORDS, 0.5);
    dimension(
        "witness_credibility",
        raw,
        WEIGHT_WITNESS_CREDIBILITY,
        format!("Credibility label: {}", input.credibility),
    )
}

fn description_detail(input: &ScoringInput) -> DimensionScore {
    let len = input.description.chars().count();
    let base = if len >= 1000 {
        5.0
    } else if len >= 500 {
        4.0
    } else if len >= 200 {
        3.0
    } else if len >= 50 {
        1.5
    } else {
        0.0
    };
    let raw = base + keyword_points(&input.description, DETAIL_KEYWORDS, 0.4);
    dimension(
        "description_detail",
        raw,
        WEIGHT_DESCRIPTION_DETAIL,
        format!("Description length: {len} chars"),
    )
}

fn location_specificity(input: &ScoringInput) -> DimensionScore {
    let mut raw = 0.0;
    if input.coordinates.is_some() {
        raw += 5.0;
    }
    if input.location_text.as_deref().is_some_and(|t| !t.trim().is_empty()) {
        raw += 2.0;
    }
    raw += keyword_points(&input.description, LOCATION_KEYWORDS, 0.5);
    dimension(
        "location_specificity",
        raw,
        WEIGHT_LOCATION_SPECIFICITY,
        if input.coordinates.is_some() {
            "Coordinates present".into()
        } else {
            "No coordinates".into()
        },
    )
}

fn temporal_precision(input: &ScoringInput) -> DimensionScore {
    let mut raw = 0.0;
    let mut explanation = "No event date".to_string();
    if let Some(dt) = input.event_date {
        raw += 4.0;
        explanation = "Event date present".into();
        // A non-midnight timestamp means the submitter gave a time of day.
        if dt.hour() != 0 || dt.minute() != 0 {
            raw += 3.0;
            explanation = "Event date with time of day".into();
        }
    }
    raw += keyword_points(&input.description, DURATION_KEYWORDS, 0.5);
    dimension("temporal_precision", raw, WEIGHT_TEMPORAL_PRECISION, explanation)
}

fn source_reliability(input: &ScoringInput) -> DimensionScore {
    let mut raw = 0.0;
    if input.official_report {
        raw += 4.0;
    }
    raw += match input.credibility {
        Credibility::Verified => 3.0,
        Credibility::Probable => 2.0,
        _ => 0.0,
    };
    let has_source_tag = input
        .tags
        .iter()
        .any(|t| matches!(t.to_lowercase().as_str(), "news" | "mufon" | "police-blotter"));
    if has_source_tag {
        raw += 1.0;
    }
    dimension(
        "source_reliability",
        raw,
        WEIGHT_SOURCE_RELIABILITY,
        if input.official_report {
            "Backed by an official report".into()
        } else {
            "Self-reported".into()
        },
    )
}

fn corroboration_potential(input: &ScoringInput) -> DimensionScore {
    let mut raw = 0.0;
    if input.witness_count.unwrap_or(0) >= 2 {
        raw += 3.0;
    }
    if input.photo_video {
        raw += 3.0;
    }
    raw += (input.tags.len() as f64 * 0.5).min(2.0);
    raw += keyword_points(&input.description, CORROBORATION_KEYWORDS, 1.0);
    dimension(
        "corroboration_potential",
        raw,
        WEIGHT_CORROBORATION_POTENTIAL,
        format!("{} witnesses reported", input.witness_count.unwrap_or(0)),
    )
}

fn narrative_coherence(input: &ScoringInput) -> DimensionScore {
    let mut raw = 0.0;
    let sentences = input
        .description
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    if sentences >= 3 {
        raw += 3.0;
    }
    if input.description.chars().count() >= 100 {
        raw += 2.0;
    }
    let has_when = keyword_points(&input.description, DURATION_KEYWORDS, 1.0) > 0.0
        || input.event_date.is_some();
    let has_where = input.coordinates.is_some()
        || keyword_points(&input.description, LOCATION_KEYWORDS, 1.0) > 0.0;
    if has_when && has_where {
        raw += 2.0;
    }
    dimension(
        "narrative_coherence",
        raw,
        WEIGHT_NARRATIVE_COHERENCE,
        format!("{sentences} sentences"),
    )
}

fn content_originality(input: &ScoringInput) -> DimensionScore {
    let mut raw = 0.0;
    if input.description.chars().count() >= 50 {
        raw += 3.0;
    }
    if input.title.chars().count() >= 20 {
        raw += 2.0;
    }
    let secondhand = keyword_points(&input.description, SECONDHAND_KEYWORDS, 1.0) > 0.0;
    if !secondhand {
        raw += 3.0;
    }
    dimension(
        "content_originality",
        raw,
        WEIGHT_CONTENT_ORIGINALITY,
        if secondhand {
            "Appears to be a secondhand account".into()
        } else {
            "Firsthand account".into()
        },
    )
}

fn data_completeness(input: &ScoringInput) -> DimensionScore {
    let fields: [bool; 6] = [
        !input.title.trim().is_empty(),
        input.description.chars().count() >= 50,
        input.coordinates.is_some(),
        input.event_date.is_some(),
        !input.tags.is_empty(),
        input.physical_evidence || input.photo_video || input.official_report,
    ];
    let filled = fields.iter().filter(|f| **f).count();
    dimension(
        "data_completeness",
        filled as f64 * 1.5,
        WEIGHT_DATA_COMPLETENESS,
        format!("{filled}/6 fields populated"),
    )
}

/// Score a report across all ten dimensions.
pub fn score(input: &ScoringInput) -> QualityReport {
    let dimensions = vec![
        evidence_strength(input),
        witness_credibility(input),
        description_detail(input),
        location_specificity(input),
        temporal_precision(input),
        source_reliability(input),
        corroboration_potential(input),
        narrative_coherence(input),
        content_originality(input),
        data_completeness(input),
    ];

    let total_weighted: f64 = dimensions.iter().map(|d| d.weighted).sum();
    let composite = (total_weighted / (TOTAL_WEIGHT * 10.0) * 100.0).clamp(0.0, 100.0);

    let grade = if composite >= 90.0 {
        Grade::A
    } else if composite >= 75.0 {
        Grade::B
    } else if composite >= 60.0 {
        Grade::C
    } else if composite >= 40.0 {
        Grade::D
    } else {
        Grade::F
    };

    let recommended_status = if composite >= 75.0 {
        RecommendedStatus::Approved
    } else if composite >= 40.0 {
        RecommendedStatus::PendingReview
    } else {
        RecommendedStatus::Rejected
    };

    QualityReport {
        dimensions,
        composite,
        grade,
        recommended_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_input() -> ScoringInput {
        ScoringInput {
            title: String::new(),
            description: String::new(),
            category: Category::Other,
            coordinates: None,
            location_text: None,
            event_date: None,
            physical_evidence: false,
            photo_video: false,
            official_report: false,
            credibility: Credibility::Unverified,
            tags: vec![],
            witness_count: None,
        }
    }

    fn rich_input() -> ScoringInput {
        ScoringInput {
            title: "Disc-shaped object over the reservoir at dusk".into(),
            description: "I observed a metallic disc approximately 20 meters across hovering \
                near the highway for three minutes. It changed direction twice and left a \
                trace of residue on the field below. Multiple people stopped their cars; \
                an off-duty police officer also reported it. The sighting lasted about four \
                minutes in total and was captured on a dashboard recording."
                .into(),
            category: Category::Ufo,
            coordinates: Some(Coordinates::new(41.2, -73.9).unwrap()),
            location_text: Some("Route 9, north of Peekskill".into()),
            event_date: Some("2023-05-14T21:30:00Z".parse().unwrap()),
            physical_evidence: true,
            photo_video: true,
            official_report: true,
            credibility: Credibility::Verified,
            tags: vec!["ufo".into(), "news".into(), "disc".into()],
            witness_count: Some(5),
        }
    }

    #[test]
    fn test_composite_in_bounds() {
        for input in [bare_input(), rich_input()] {
            let report = score(&input);
            assert!((0.0..=100.0).contains(&report.composite));
        }
    }

    #[test]
    fn test_pure_and_deterministic() {
        let input = rich_input();
        let a = score(&input);
        let b = score(&input);
        assert_eq!(a.composite, b.composite);
        assert_eq!(a.grade, b.grade);
        for (da, db) in a.dimensions.iter().zip(b.dimensions.iter()) {
            assert_eq!(da.score, db.score);
            assert_eq!(da.weighted, db.weighted);
        }
    }

    #[test]
    fn test_ten_dimensions_each_capped() {
        let report = score(&rich_input());
        assert_eq!(report.dimensions.len(), 10);
        for d in &report.dimensions {
            assert!((0.0..=10.0).contains(&d.score), "{} = {}", d.name, d.score);
            assert!((d.weighted - d.score * d.weight).abs() < 1e-9);
        }
    }

    #[test]
    fn test_evidence_weighted_highest() {
        let report = score(&rich_input());
        let evidence = report
            .dimensions
            .iter()
            .find(|d| d.name == "evidence_strength")
            .unwrap();
        assert!((evidence.weight - 1.2).abs() < 1e-9);
        for d in &report.dimensions {
            assert!(d.weight <= 1.2 && d.weight >= 0.8);
        }
    }

    #[test]
    fn test_rich_report_approved() {
        let report = score(&rich_input());
        assert!(report.composite >= 75.0, "composite = {}", report.composite);
        assert_eq!(report.recommended_status, RecommendedStatus::Approved);
    }

    #[test]
    fn test_bare_report_rejected() {
        let report = score(&bare_input());
        assert!(report.composite < 40.0, "composite = {}", report.composite);
        assert_eq!(report.grade, Grade::F);
        assert_eq!(report.recommended_status, RecommendedStatus::Rejected);
    }

    #[test]
    fn test_grade_thresholds() {
        // Verify band edges through the public contract rather than internals:
        // a mid-tier report lands between rejected and approved.
        let mut input = bare_input();
        input.title = "Strange lights seen over the ridge".into();
        input.description = "Three lights moved in formation above the ridge for several \
            minutes before fading. I watched them from my porch near the highway."
            .into();
        input.coordinates = Some(Coordinates::new(44.0, -110.0).unwrap());
        input.event_date = Some("2023-02-01T00:00:00Z".parse().unwrap());
        input.credibility = Credibility::Probable;
        input.photo_video = true;
        input.tags = vec!["lights".into()];
        let report = score(&input);
        assert_eq!(report.recommended_status, RecommendedStatus::PendingReview);
    }
}
