mod common;

use common::{approved_report, repos, ts};
use openanomaly::application::clustering::{cluster_reports, ClusterOptions};
use openanomaly::application::registry::PatternRegistry;
use openanomaly::domain::entities::pattern::PatternStatus;
use openanomaly::domain::values::category::Category;

#[test]
fn test_new_cluster_inserts_pattern_with_links() {
    let r = repos();
    let reports: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("Sighting {i}"),
                Category::Ufo,
                41.20 + f64::from(i) * 0.01,
                -73.90,
                ts("2023-05-10T20:00:00Z"),
            )
        })
        .collect();
    for report in &reports {
        r.reports.add(report).unwrap();
    }

    let now = ts("2023-05-15T00:00:00Z");
    let clusters = cluster_reports(&reports, &ClusterOptions::default(), now);
    assert_eq!(clusters.len(), 1);

    let registry = PatternRegistry::new(r.patterns.clone());
    let outcome = registry.reconcile(&clusters[0], 50.0, now).unwrap().unwrap();
    assert!(!outcome.merged);
    assert_eq!(outcome.links_added, 3);

    let pattern = r.patterns.get_by_id(&outcome.pattern_id).unwrap().unwrap();
    assert_eq!(pattern.report_count, 3);
    assert_eq!(pattern.first_detected_at, now);
    assert_eq!(r.patterns.link_count(&pattern.id).unwrap(), 3);
}

#[test]
fn test_reconciling_same_cluster_twice_is_a_noop() {
    let r = repos();
    let reports: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("Sighting {i}"),
                Category::Ufo,
                41.20 + f64::from(i) * 0.01,
                -73.90,
                ts("2023-05-10T20:00:00Z"),
            )
        })
        .collect();

    let now = ts("2023-05-15T00:00:00Z");
    let clusters = cluster_reports(&reports, &ClusterOptions::default(), now);
    let registry = PatternRegistry::new(r.patterns.clone());

    let first = registry.reconcile(&clusters[0], 50.0, now).unwrap().unwrap();
    let second = registry.reconcile(&clusters[0], 50.0, now).unwrap().unwrap();

    assert!(second.merged);
    assert_eq!(second.pattern_id, first.pattern_id);
    assert_eq!(second.links_added, 0);
    let pattern = r.patterns.get_by_id(&first.pattern_id).unwrap().unwrap();
    assert_eq!(pattern.report_count, 3);
    assert_eq!(r.patterns.list(None, None).unwrap().len(), 1);
}

#[test]
fn test_nearby_cluster_merges_into_existing_pattern() {
    let r = repos();
    let now = ts("2023-05-15T00:00:00Z");
    let registry = PatternRegistry::new(r.patterns.clone());

    let first_wave: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("First wave {i}"),
                Category::Ufo,
                41.20 + f64::from(i) * 0.01,
                -73.90,
                ts("2023-05-10T20:00:00Z"),
            )
        })
        .collect();
    let clusters = cluster_reports(&first_wave, &ClusterOptions::default(), now);
    let inserted = registry.reconcile(&clusters[0], 50.0, now).unwrap().unwrap();

    // Second wave a few hundredths of a degree away, still inside the merge box.
    let second_wave: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("Second wave {i}"),
                Category::Ghost,
                41.25 + f64::from(i) * 0.01,
                -73.88,
                ts("2023-05-20T20:00:00Z"),
            )
        })
        .collect();
    let later = ts("2023-05-21T00:00:00Z");
    let clusters = cluster_reports(&second_wave, &ClusterOptions::default(), later);
    let merged = registry.reconcile(&clusters[0], 50.0, later).unwrap().unwrap();

    assert!(merged.merged);
    assert_eq!(merged.pattern_id, inserted.pattern_id);
    assert_eq!(merged.links_added, 3);

    let pattern = r.patterns.get_by_id(&inserted.pattern_id).unwrap().unwrap();
    assert_eq!(pattern.report_count, 6);
    assert!(pattern.categories.contains(&Category::Ufo));
    assert!(pattern.categories.contains(&Category::Ghost));
    assert_eq!(pattern.first_report_date, Some(ts("2023-05-10T20:00:00Z")));
    assert_eq!(pattern.last_report_date, Some(ts("2023-05-20T20:00:00Z")));
    assert_eq!(pattern.last_updated_at, later);
}

#[test]
fn test_distant_cluster_gets_its_own_pattern() {
    let r = repos();
    let now = ts("2023-05-15T00:00:00Z");
    let registry = PatternRegistry::new(r.patterns.clone());

    for (base_lat, base_lng) in [(41.2, -73.9), (34.0, -118.2)] {
        let reports: Vec<_> = (0..3)
            .map(|i| {
                approved_report(
                    &format!("Sighting {base_lat} {i}"),
                    Category::Ufo,
                    base_lat + f64::from(i) * 0.01,
                    base_lng,
                    ts("2023-05-10T20:00:00Z"),
                )
            })
            .collect();
        let clusters = cluster_reports(&reports, &ClusterOptions::default(), now);
        let outcome = registry.reconcile(&clusters[0], 50.0, now).unwrap().unwrap();
        assert!(!outcome.merged);
    }

    assert_eq!(r.patterns.list(None, None).unwrap().len(), 2);
}

#[test]
fn test_archived_pattern_is_never_revived_by_reconcile() {
    let r = repos();
    let now = ts("2023-05-15T00:00:00Z");
    let registry = PatternRegistry::new(r.patterns.clone());

    let first_wave: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("First wave {i}"),
                Category::Ufo,
                41.20 + f64::from(i) * 0.01,
                -73.90,
                ts("2023-05-10T20:00:00Z"),
            )
        })
        .collect();
    let clusters = cluster_reports(&first_wave, &ClusterOptions::default(), now);
    let inserted = registry.reconcile(&clusters[0], 50.0, now).unwrap().unwrap();
    r.patterns
        .set_status(&inserted.pattern_id, PatternStatus::Archived)
        .unwrap();

    // New activity two hundredths of a degree away lands in the same
    // centroid cell as the archived pattern. The cluster is dropped.
    let second_wave: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("Second wave {i}"),
                Category::Ufo,
                41.22 + f64::from(i) * 0.01,
                -73.90,
                ts("2023-05-20T20:00:00Z"),
            )
        })
        .collect();
    let later = ts("2023-05-21T00:00:00Z");
    let clusters = cluster_reports(&second_wave, &ClusterOptions::default(), later);
    let outcome = registry.reconcile(&clusters[0], 50.0, later).unwrap();
    assert!(outcome.is_none());

    let pattern = r.patterns.get_by_id(&inserted.pattern_id).unwrap().unwrap();
    assert_eq!(pattern.status, PatternStatus::Archived);
    assert_eq!(pattern.last_updated_at, now);
    assert_eq!(r.patterns.link_count(&pattern.id).unwrap(), 3);
    assert_eq!(r.patterns.list(None, None).unwrap().len(), 1);
}

#[test]
fn test_cluster_near_archived_pattern_starts_fresh_in_its_own_cell() {
    let r = repos();
    let now = ts("2023-05-15T00:00:00Z");
    let registry = PatternRegistry::new(r.patterns.clone());

    let first_wave: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("First wave {i}"),
                Category::Ufo,
                41.20 + f64::from(i) * 0.01,
                -73.90,
                ts("2023-05-10T20:00:00Z"),
            )
        })
        .collect();
    let clusters = cluster_reports(&first_wave, &ClusterOptions::default(), now);
    let inserted = registry.reconcile(&clusters[0], 50.0, now).unwrap().unwrap();
    r.patterns
        .set_status(&inserted.pattern_id, PatternStatus::Archived)
        .unwrap();

    // Inside the merge box but a different centroid cell: the archived
    // pattern is not a merge target, so a fresh pattern is created.
    let second_wave: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("Second wave {i}"),
                Category::Ufo,
                41.27 + f64::from(i) * 0.01,
                -73.90,
                ts("2023-05-20T20:00:00Z"),
            )
        })
        .collect();
    let later = ts("2023-05-21T00:00:00Z");
    let clusters = cluster_reports(&second_wave, &ClusterOptions::default(), later);
    let outcome = registry.reconcile(&clusters[0], 50.0, later).unwrap().unwrap();

    assert!(!outcome.merged);
    assert_ne!(outcome.pattern_id, inserted.pattern_id);
    assert_eq!(
        r.patterns.get_by_id(&inserted.pattern_id).unwrap().unwrap().status,
        PatternStatus::Archived
    );
    assert_eq!(r.patterns.list(None, None).unwrap().len(), 2);
}

#[test]
fn test_ambiguous_cluster_merges_into_nearest_pattern() {
    let r = repos();
    let now = ts("2023-05-15T00:00:00Z");
    let registry = PatternRegistry::new(r.patterns.clone());

    // Two established patterns 0.12 degrees apart, so they never merged
    // with each other.
    let mut seeded = Vec::new();
    for base_lat in [41.20, 41.32] {
        let reports: Vec<_> = (0..3)
            .map(|i| {
                approved_report(
                    &format!("Sighting {base_lat} {i}"),
                    Category::Ufo,
                    base_lat + f64::from(i) * 0.01,
                    -73.90,
                    ts("2023-05-10T20:00:00Z"),
                )
            })
            .collect();
        let clusters = cluster_reports(&reports, &ClusterOptions::default(), now);
        seeded.push(registry.reconcile(&clusters[0], 50.0, now).unwrap().unwrap());
    }
    assert_eq!(r.patterns.list(None, None).unwrap().len(), 2);

    // A new cluster at 41.30 sees both (41.21 and 41.33) inside its merge
    // box; the nearer centroid wins.
    let newcomers: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("Newcomer {i}"),
                Category::Ufo,
                41.29 + f64::from(i) * 0.01,
                -73.90,
                ts("2023-05-20T20:00:00Z"),
            )
        })
        .collect();
    let later = ts("2023-05-21T00:00:00Z");
    let clusters = cluster_reports(&newcomers, &ClusterOptions::default(), later);
    let merged = registry.reconcile(&clusters[0], 50.0, later).unwrap().unwrap();

    assert!(merged.merged);
    assert_eq!(merged.pattern_id, seeded[1].pattern_id);
    assert_eq!(
        r.patterns.get_by_id(&seeded[0].pattern_id).unwrap().unwrap().report_count,
        3
    );
    assert_eq!(r.patterns.list(None, None).unwrap().len(), 2);
}
