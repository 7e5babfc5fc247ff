mod common;

use common::{days_ago, rich_new_report};
use openanomaly::application::detect::DetectOptions;
use openanomaly::infrastructure::geocode::noop::NoopGeocoder;
use openanomaly::infrastructure::narrative::template::TemplateNarrative;
use openanomaly::domain::values::category::Category;
use openanomaly::OpenAnomaly;
use std::sync::Arc;

fn open(path: &str) -> OpenAnomaly {
    OpenAnomaly::with_providers(path, Arc::new(NoopGeocoder), Arc::new(TemplateNarrative)).unwrap()
}

#[test]
fn test_patterns_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.db");
    let path = path.to_str().unwrap();

    let pattern_id = {
        let oa = open(path);
        for i in 0..3 {
            oa.add_report(rich_new_report(
                &format!("Sighting {i}"),
                Category::Ufo,
                41.20 + f64::from(i) * 0.01,
                -73.90,
                days_ago(2),
            ))
            .unwrap();
        }
        let summary = oa.detect(&DetectOptions::default()).unwrap();
        assert_eq!(summary.inserted, 1);
        oa.patterns(None, None).unwrap()[0].id.clone()
    };

    let oa = open(path);
    let patterns = oa.patterns(None, None).unwrap();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].id, pattern_id);
    assert_eq!(patterns[0].report_count, 3);

    let stats = oa.stats().unwrap();
    assert_eq!(stats.reports.total_reports, 3);
    assert_eq!(stats.patterns.total_links, 3);

    // A rerun against the reopened database changes nothing.
    let summary = oa.detect(&DetectOptions::default()).unwrap();
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.matched, 0);
}
