//! Greedy spatial clustering sweep.
//!
//! Single pass over reports in the caller-supplied order. The result depends
//! on that order: an earlier seed claims every unassigned report in range, so
//! reshuffling the input can regroup borderline members. This is a documented
//! property the registry's merge-by-centroid step relies on, not a bug; the
//! repositories return reports in stable id order to keep runs reproducible.

use crate::domain::entities::report::Report;
use crate::domain::values::category::Category;
use crate::domain::values::cluster::{intensity, Cluster, ClusterMember, ACTIVE_WINDOW_DAYS};
use crate::domain::values::credibility::Credibility;
use crate::domain::values::geo::{centroid, BoundingBox, Coordinates};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
pub struct ClusterOptions {
    pub radius_km: f64,
    pub min_members: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius_km: 50.0,
            min_members: 3,
        }
    }
}

/// Group reports into clusters of at least `min_members` within `radius_km`
/// of a seed report. Reports without coordinates are skipped silently.
/// Reports that never reach the member threshold stay unclustered; a future
/// run with more data may push them over it.
pub fn cluster_reports(reports: &[Report], options: &ClusterOptions, now: DateTime<Utc>) -> Vec<Cluster> {
    let located: Vec<(&Report, Coordinates)> = reports
        .iter()
        .filter_map(|r| r.coordinates.map(|c| (r, c)))
        .collect();

    let mut assigned = vec![false; located.len()];
    let mut clusters = Vec::new();

    for i in 0..located.len() {
        if assigned[i] {
            continue;
        }
        let (_, seed) = located[i];

        // Coarse degree-space box first; haversine only for survivors.
        let bbox = BoundingBox::around(&seed, options.radius_km);
        let mut member_idx = vec![i];
        for (j, (_, coords)) in located.iter().enumerate() {
            if j == i || assigned[j] {
                continue;
            }
            if bbox.contains(coords) && seed.distance_km(coords) <= options.radius_km {
                member_idx.push(j);
            }
        }

        if member_idx.len() < options.min_members {
            continue;
        }
        for &j in &member_idx {
            assigned[j] = true;
        }

        clusters.push(build_cluster(&member_idx, &located, now));
    }

    clusters
}

fn build_cluster(member_idx: &[usize], located: &[(&Report, Coordinates)], now: DateTime<Utc>) -> Cluster {
    let members: Vec<ClusterMember> = member_idx
        .iter()
        .map(|&j| ClusterMember {
            report_id: located[j].0.id.clone(),
            coordinates: located[j].1,
        })
        .collect();

    let points: Vec<Coordinates> = members.iter().map(|m| m.coordinates).collect();
    // Non-empty by construction: min_members >= 1 was already checked.
    let center = centroid(&points).unwrap_or(points[0]);

    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    let mut first_event: Option<DateTime<Utc>> = None;
    let mut last_event: Option<DateTime<Utc>> = None;
    let mut has_verified = false;
    for &j in member_idx {
        let report = located[j].0;
        *counts.entry(report.category).or_insert(0) += 1;
        if let Some(date) = report.event_date {
            first_event = Some(first_event.map_or(date, |f| f.min(date)));
            last_event = Some(last_event.map_or(date, |l| l.max(date)));
        }
        if report.credibility == Credibility::Verified {
            has_verified = true;
        }
    }

    // Mode; ties break on canonical category order via the BTreeMap walk.
    let primary_category = counts
        .iter()
        .max_by_key(|(_, n)| **n)
        .map(|(c, _)| *c)
        .unwrap_or(Category::Other);

    let days_active = first_event.map_or(0, |f| (now - f).num_days().max(0));
    let is_active = last_event.is_some_and(|l| (now - l).num_days() <= ACTIVE_WINDOW_DAYS);

    Cluster {
        intensity: intensity(members.len(), days_active, has_verified),
        category_counts: counts.into_iter().collect(),
        primary_category,
        first_event,
        last_event,
        is_active,
        has_verified,
        centroid: center,
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::cluster::intensity;

    fn report_at(lat: f64, lng: f64, category: Category, event: &str, credibility: Credibility) -> Report {
        let mut r = Report::new(
            category,
            format!("sighting at {lat},{lng}"),
            "test report".to_string(),
            Some(Coordinates::new(lat, lng).unwrap()),
            None,
            Some(event.parse().unwrap()),
            credibility,
            vec![],
            None,
        );
        // Deterministic ids so the sweep order is fixed across runs.
        r.id = format!("{lat:.4}:{lng:.4}:{event}");
        r
    }

    fn now() -> DateTime<Utc> {
        "2023-03-10T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_min_members_threshold() {
        let opts = ClusterOptions::default();
        // Two nearby reports: below threshold, no cluster.
        let two = vec![
            report_at(40.0, -75.0, Category::Ufo, "2023-01-01T00:00:00Z", Credibility::Unverified),
            report_at(40.01, -75.0, Category::Ufo, "2023-01-02T00:00:00Z", Credibility::Unverified),
        ];
        assert!(cluster_reports(&two, &opts, now()).is_empty());

        // Exactly three: one cluster.
        let mut three = two;
        three.push(report_at(40.02, -75.0, Category::Ufo, "2023-01-03T00:00:00Z", Credibility::Unverified));
        let clusters = cluster_reports(&three, &opts, now());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].report_count(), 3);
    }

    #[test]
    fn test_separated_groups_form_disjoint_clusters() {
        let opts = ClusterOptions::default();
        let mut reports = Vec::new();
        // Group A near (40, -75), group B near (45, -70): ~650 km apart.
        for i in 0..3 {
            reports.push(report_at(40.0 + i as f64 * 0.01, -75.0, Category::Ufo, "2023-01-01T00:00:00Z", Credibility::Unverified));
            reports.push(report_at(45.0 + i as f64 * 0.01, -70.0, Category::Ghost, "2023-01-01T00:00:00Z", Credibility::Unverified));
        }
        let clusters = cluster_reports(&reports, &opts, now());
        assert_eq!(clusters.len(), 2);
        let mut all_ids: Vec<&str> = clusters
            .iter()
            .flat_map(|c| c.members.iter().map(|m| m.report_id.as_str()))
            .collect();
        all_ids.sort_unstable();
        all_ids.dedup();
        assert_eq!(all_ids.len(), 6, "clusters must be disjoint");
    }

    #[test]
    fn test_deterministic_for_fixed_order() {
        let opts = ClusterOptions::default();
        let reports: Vec<Report> = (0..10)
            .map(|i| {
                report_at(
                    40.0 + (i % 5) as f64 * 0.05,
                    -75.0 + (i / 5) as f64 * 0.05,
                    Category::Ufo,
                    "2023-01-01T00:00:00Z",
                    Credibility::Unverified,
                )
            })
            .collect();
        let a = cluster_reports(&reports, &opts, now());
        let b = cluster_reports(&reports, &opts, now());
        assert_eq!(a.len(), b.len());
        for (ca, cb) in a.iter().zip(b.iter()) {
            let ids_a: Vec<_> = ca.members.iter().map(|m| &m.report_id).collect();
            let ids_b: Vec<_> = cb.members.iter().map(|m| &m.report_id).collect();
            assert_eq!(ids_a, ids_b);
        }
    }

    #[test]
    fn test_reports_without_coordinates_skipped() {
        let opts = ClusterOptions::default();
        let mut reports = vec![
            report_at(40.0, -75.0, Category::Ufo, "2023-01-01T00:00:00Z", Credibility::Unverified),
            report_at(40.01, -75.0, Category::Ufo, "2023-01-02T00:00:00Z", Credibility::Unverified),
            report_at(40.02, -75.0, Category::Ufo, "2023-01-03T00:00:00Z", Credibility::Unverified),
        ];
        let mut no_coords = reports[0].clone();
        no_coords.id = "no-coords".into();
        no_coords.coordinates = None;
        reports.push(no_coords);

        let clusters = cluster_reports(&reports, &opts, now());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].report_count(), 3);
        assert!(clusters[0].members.iter().all(|m| m.report_id != "no-coords"));
    }

    #[test]
    fn test_five_report_scenario() {
        // 5 reports within 10 km, categories [ufo, ufo, ufo, ghost, ufo],
        // dates spanning 2023-01-01 to 2023-03-01, one verified.
        let opts = ClusterOptions {
            radius_km: 50.0,
            min_members: 3,
        };
        let reports = vec![
            report_at(41.00, -73.90, Category::Ufo, "2023-01-01T00:00:00Z", Credibility::Verified),
            report_at(41.02, -73.91, Category::Ufo, "2023-01-15T00:00:00Z", Credibility::Unverified),
            report_at(41.04, -73.92, Category::Ufo, "2023-02-01T00:00:00Z", Credibility::Unverified),
            report_at(41.01, -73.93, Category::Ghost, "2023-02-15T00:00:00Z", Credibility::Unverified),
            report_at(41.03, -73.94, Category::Ufo, "2023-03-01T00:00:00Z", Credibility::Unverified),
        ];
        let now = now();
        let clusters = cluster_reports(&reports, &opts, now);
        assert_eq!(clusters.len(), 1);

        let c = &clusters[0];
        assert_eq!(c.report_count(), 5);
        assert_eq!(c.primary_category, Category::Ufo);
        assert!(c.has_verified);
        assert!(c.is_active);
        assert_eq!(c.first_event, Some("2023-01-01T00:00:00Z".parse().unwrap()));
        assert_eq!(c.last_event, Some("2023-03-01T00:00:00Z".parse().unwrap()));

        let days_active = (now - c.first_event.unwrap()).num_days();
        let expected = intensity(5, days_active, true);
        assert!((c.intensity - expected).abs() < 1e-9);
        // 68 days active: base log10(6)*25 ≈ 19.45, recency 20, verified 20.
        assert!((c.intensity - (6.0_f64.log10() * 25.0 + 40.0)).abs() < 1e-9);
    }
}
