mod common;

use common::{approved_report, repos, ts};
use openanomaly::application::artifact_guard::{ArtifactGuard, ARCHIVE_REASON_BULK_IMPORT};
use openanomaly::application::clustering::{cluster_reports, ClusterOptions};
use openanomaly::application::registry::PatternRegistry;
use openanomaly::domain::entities::pattern::PatternStatus;
use openanomaly::domain::values::category::Category;

fn seed_pattern(
    r: &common::TestRepos,
    base_lat: f64,
    detected: chrono::DateTime<chrono::Utc>,
) -> String {
    let members: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("Member {base_lat} {i}"),
                Category::Ufo,
                base_lat + f64::from(i) * 0.01,
                -73.90,
                ts("2023-05-01T20:00:00Z"),
            )
        })
        .collect();
    let clusters = cluster_reports(&members, &ClusterOptions::default(), detected);
    let registry = PatternRegistry::new(r.patterns.clone());
    registry.reconcile(&clusters[0], 50.0, detected).unwrap().unwrap().pattern_id
}

#[test]
fn test_fresh_surge_pattern_is_archived_with_reason() {
    let r = repos();
    let now = ts("2023-05-05T00:00:00Z");
    let id = seed_pattern(&r, 41.2, ts("2023-05-03T00:00:00Z"));

    let mut pattern = r.patterns.get_by_id(&id).unwrap().unwrap();
    pattern.report_count = 600;
    r.patterns.update(&pattern).unwrap();

    let guard = ArtifactGuard::new(r.patterns.clone());
    let sweep = guard.run(now).unwrap();
    assert_eq!(sweep.archived, vec![id.clone()]);

    let pattern = r.patterns.get_by_id(&id).unwrap().unwrap();
    assert_eq!(pattern.status, PatternStatus::Archived);
    let metadata = pattern.metadata.unwrap();
    assert_eq!(
        metadata["archived_reason"].as_str(),
        Some(ARCHIVE_REASON_BULK_IMPORT)
    );
    assert!(metadata["archived_at"].as_str().is_some());
    // Member links survive archival.
    assert_eq!(r.patterns.link_count(&id).unwrap(), 3);
}

#[test]
fn test_title_marker_triggers_archival() {
    let r = repos();
    let id = seed_pattern(&r, 41.2, ts("2023-05-03T00:00:00Z"));

    let mut pattern = r.patterns.get_by_id(&id).unwrap().unwrap();
    pattern.title = "UFO activity hotspot (1300 reports)".to_string();
    r.patterns.update(&pattern).unwrap();

    let guard = ArtifactGuard::new(r.patterns.clone());
    let sweep = guard.run(ts("2023-05-05T00:00:00Z")).unwrap();
    assert_eq!(sweep.archived, vec![id]);
}

#[test]
fn test_established_pattern_is_left_alone() {
    let r = repos();
    // Detected a month ago: outside the recent window even with surge volume.
    let id = seed_pattern(&r, 41.2, ts("2023-04-01T00:00:00Z"));
    let mut pattern = r.patterns.get_by_id(&id).unwrap().unwrap();
    pattern.report_count = 600;
    r.patterns.update(&pattern).unwrap();

    let guard = ArtifactGuard::new(r.patterns.clone());
    let sweep = guard.run(ts("2023-05-05T00:00:00Z")).unwrap();
    assert_eq!(sweep.scanned, 0);
    assert!(sweep.archived.is_empty());
    assert_ne!(
        r.patterns.get_by_id(&id).unwrap().unwrap().status,
        PatternStatus::Archived
    );
}

#[test]
fn test_ordinary_fresh_pattern_is_left_alone() {
    let r = repos();
    let id = seed_pattern(&r, 41.2, ts("2023-05-03T00:00:00Z"));

    let guard = ArtifactGuard::new(r.patterns.clone());
    let sweep = guard.run(ts("2023-05-05T00:00:00Z")).unwrap();
    assert_eq!(sweep.scanned, 1);
    assert!(sweep.archived.is_empty());
    assert_eq!(
        r.patterns.get_by_id(&id).unwrap().unwrap().status,
        PatternStatus::Emerging
    );
}

#[test]
fn test_guard_does_not_rearchive() {
    let r = repos();
    let id = seed_pattern(&r, 41.2, ts("2023-05-03T00:00:00Z"));
    let mut pattern = r.patterns.get_by_id(&id).unwrap().unwrap();
    pattern.report_count = 600;
    r.patterns.update(&pattern).unwrap();

    let guard = ArtifactGuard::new(r.patterns.clone());
    let now = ts("2023-05-05T00:00:00Z");
    guard.run(now).unwrap();
    let second = guard.run(now).unwrap();
    assert!(second.archived.is_empty());
}
