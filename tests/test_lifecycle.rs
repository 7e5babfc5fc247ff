mod common;

use common::{approved_report, repos, ts};
use openanomaly::application::clustering::{cluster_reports, ClusterOptions};
use openanomaly::application::lifecycle::LifecycleManager;
use openanomaly::application::registry::PatternRegistry;
use openanomaly::domain::entities::pattern::PatternStatus;
use openanomaly::domain::values::category::Category;

fn seed_pattern(r: &common::TestRepos, detected: chrono::DateTime<chrono::Utc>) -> String {
    let members: Vec<_> = (0..3)
        .map(|i| {
            approved_report(
                &format!("Member {i}"),
                Category::Cryptid,
                47.0 + f64::from(i) * 0.01,
                -122.0,
                ts("2022-12-25T20:00:00Z"),
            )
        })
        .collect();
    let clusters = cluster_reports(&members, &ClusterOptions::default(), detected);
    let registry = PatternRegistry::new(r.patterns.clone());
    registry.reconcile(&clusters[0], 50.0, detected).unwrap().unwrap().pattern_id
}

#[test]
fn test_untouched_pattern_walks_down_the_staleness_bands() {
    let r = repos();
    let detected = ts("2023-01-01T00:00:00Z");
    let id = seed_pattern(&r, detected);
    let lifecycle = LifecycleManager::new(r.patterns.clone());

    // Fresh: no transition.
    let sweep = lifecycle.run(ts("2023-01-05T00:00:00Z")).unwrap();
    assert_eq!(sweep.evaluated, 1);
    assert!(sweep.transitions.is_empty());

    // Ten days untouched: emerging -> active.
    let sweep = lifecycle.run(ts("2023-01-11T00:00:00Z")).unwrap();
    assert_eq!(sweep.transitions.len(), 1);
    assert_eq!(sweep.transitions[0].from, PatternStatus::Emerging);
    assert_eq!(sweep.transitions[0].to, PatternStatus::Active);

    // Forty days: active -> declining.
    let sweep = lifecycle.run(ts("2023-02-10T00:00:00Z")).unwrap();
    assert_eq!(sweep.transitions[0].to, PatternStatus::Declining);

    // Past ninety days: declining -> historical.
    let sweep = lifecycle.run(ts("2023-04-15T00:00:00Z")).unwrap();
    assert_eq!(sweep.transitions[0].to, PatternStatus::Historical);

    let pattern = r.patterns.get_by_id(&id).unwrap().unwrap();
    assert_eq!(pattern.status, PatternStatus::Historical);
    // Status writes never advance the staleness clock.
    assert_eq!(pattern.last_updated_at, detected);
}

#[test]
fn test_archived_is_terminal() {
    let r = repos();
    let id = seed_pattern(&r, ts("2023-01-01T00:00:00Z"));
    r.patterns.set_status(&id, PatternStatus::Archived).unwrap();

    let lifecycle = LifecycleManager::new(r.patterns.clone());
    let sweep = lifecycle.run(ts("2023-06-01T00:00:00Z")).unwrap();
    assert_eq!(sweep.evaluated, 0);
    assert!(sweep.transitions.is_empty());

    let pattern = r.patterns.get_by_id(&id).unwrap().unwrap();
    assert_eq!(pattern.status, PatternStatus::Archived);
}

#[test]
fn test_pattern_written_at_this_instant_is_left_alone() {
    let r = repos();
    let detected = ts("2023-01-01T00:00:00Z");
    let id = seed_pattern(&r, detected);

    // Same clock as the write that created it: the staleness table would
    // say emerging anyway, but more to the point the sweep must not touch
    // a pattern another pass just stamped.
    let lifecycle = LifecycleManager::new(r.patterns.clone());
    let sweep = lifecycle.run(detected).unwrap();
    assert_eq!(sweep.evaluated, 0);
    assert!(sweep.transitions.is_empty());

    let pattern = r.patterns.get_by_id(&id).unwrap().unwrap();
    assert_eq!(pattern.status, PatternStatus::Emerging);
}

#[test]
fn test_lifecycle_is_idempotent_at_a_fixed_clock() {
    let r = repos();
    seed_pattern(&r, ts("2023-01-01T00:00:00Z"));
    let lifecycle = LifecycleManager::new(r.patterns.clone());

    let now = ts("2023-04-15T00:00:00Z");
    let first = lifecycle.run(now).unwrap();
    assert_eq!(first.transitions.len(), 1);
    let second = lifecycle.run(now).unwrap();
    assert!(second.transitions.is_empty());
}
