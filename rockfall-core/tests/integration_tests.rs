//! Integration tests for catalog assessment

use rockfall_core::config::{self, RockfallConfig};
use rockfall_core::site::{AlertCounts, AlertStatus};
use rockfall_core::{assess_sites, load_catalog, render_json, AlertFilter, RiskLevel, ResolvedConfig};
use std::fs;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_load_fixture_catalog() {
    let catalog = load_catalog(&fixture_path("sites.json")).unwrap();
    assert_eq!(catalog.sites.len(), 5);
    assert_eq!(catalog.alerts.len(), 4);

    // camelCase sensor keys are accepted
    let road_cut = catalog.site("road-cut-a1").unwrap();
    assert_eq!(road_cut.sensors.slope_angle, 38.2);
}

#[test]
fn test_assess_fixture_ordering_and_levels() {
    let catalog = load_catalog(&fixture_path("sites.json")).unwrap();
    let reports = assess_sites(&catalog, &ResolvedConfig::defaults().unwrap());

    let summary: Vec<(&str, u8, RiskLevel)> = reports
        .iter()
        .map(|r| (r.id.as_str(), r.percentage, r.level))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("nh-5-tunnel", 84, RiskLevel::Critical),
            ("road-cut-a1", 65, RiskLevel::High),
            ("retaining-wall-rw1", 46, RiskLevel::Moderate),
            ("slope-3-ridge", 40, RiskLevel::Moderate),
            ("bridge-support-b2", 21, RiskLevel::Safe),
        ]
    );
    assert_eq!(reports[0].active_alerts, 1);
    assert_eq!(reports[1].active_alerts, 0);
}

#[test]
fn test_assess_with_discovered_config() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("sites.json");
    fs::copy(fixture_path("sites.json"), &catalog_path).unwrap();
    fs::write(
        dir.path().join(".rockfallrc.json"),
        r#"{"exclude": ["nh-*"], "min_percentage": 40}"#,
    )
    .unwrap();

    let resolved = config::load_and_resolve(dir.path(), None).unwrap();
    assert!(resolved.config_path.is_some());

    let catalog = load_catalog(&catalog_path).unwrap();
    let ids: Vec<String> = assess_sites(&catalog, &resolved)
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["road-cut-a1", "retaining-wall-rw1", "slope-3-ridge"]);
}

#[test]
fn test_assess_site_type_filter() {
    let catalog = load_catalog(&fixture_path("sites.json")).unwrap();
    let config: RockfallConfig =
        serde_json::from_str(r#"{"site_types": ["bridge", "tunnel"]}"#).unwrap();
    let reports = assess_sites(&catalog, &config.resolve().unwrap());
    let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["nh-5-tunnel", "bridge-support-b2"]);
}

#[test]
fn test_alert_filters_on_fixture() {
    let catalog = load_catalog(&fixture_path("sites.json")).unwrap();

    let resolved = AlertFilter {
        status: Some(AlertStatus::Resolved),
        level: None,
    };
    assert_eq!(resolved.apply(&catalog.alerts).len(), 2);

    let counts = AlertCounts::from_alerts(&catalog.alerts);
    assert_eq!(counts.active, 1);
    assert_eq!(counts.acknowledged, 1);
    assert_eq!(counts.resolved, 2);
}

#[test]
fn test_json_output_is_deterministic() {
    let catalog = load_catalog(&fixture_path("sites.json")).unwrap();
    let config = ResolvedConfig::defaults().unwrap();

    let first = render_json(&assess_sites(&catalog, &config));
    for _ in 0..5 {
        assert_eq!(first, render_json(&assess_sites(&catalog, &config)));
    }
}

#[test]
fn test_load_catalog_rejects_orphan_alert() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{
            "sites": [],
            "alerts": [
                {"id": "a", "site_id": "nowhere", "level": "info", "message": "x", "status": "active"}
            ]
        }"#,
    )
    .unwrap();

    let err = load_catalog(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("unknown site"));
}

#[test]
fn test_load_catalog_missing_file() {
    let err = load_catalog(&fixture_path("does-not-exist.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read catalog file"));
}
