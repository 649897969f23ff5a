use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use weekkey_cli::{load_config, open_engine, StatusReport};
use weekkey_license::{FixedClock, LicenseConfig, LicenseStatus};

fn test_config_json() -> &'static str {
    r#"{
        "app_name": "Clipper",
        "trial_days": 3,
        "keywords": ["A","B","C","D","E","F","G","H","I","J","K","L"]
    }"#
}

fn week_10_clock() -> Arc<FixedClock> {
    let now = NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc();
    Arc::new(FixedClock::new(now))
}

#[test]
fn load_config_defaults_without_file() {
    let config = load_config(None).unwrap();
    assert_eq!(config.app_name, "WeekKey");
    assert_eq!(config.trial_days, 7);
}

#[test]
fn load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("license.json");
    std::fs::write(&path, test_config_json()).unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.app_name, "Clipper");
    assert_eq!(config.trial_days, 3);
}

#[test]
fn load_config_reports_path_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = load_config(Some(&path)).unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));
}

#[test]
fn report_tracks_trial_and_activation() {
    let dir = tempfile::tempdir().unwrap();
    let config = LicenseConfig::from_json(test_config_json()).unwrap();
    let clock = week_10_clock();
    let engine = open_engine(&config, Some(dir.path()), clock.clone()).unwrap();

    let report = StatusReport::capture(&engine);
    assert_eq!(report.status, LicenseStatus::Trial { days_remaining: 3 });
    assert_eq!(report.status_text, "Trial: 3 days left");
    assert!(report.can_use_app);
    assert!(!report.licensed);
    assert_eq!(report.current_week, 10);

    clock.advance(Duration::days(3));
    let report = StatusReport::capture(&engine);
    assert_eq!(report.status, LicenseStatus::Expired);
    assert!(!report.can_use_app);

    // Week 10 is still current: 2026-03-05 is a Thursday.
    assert!(engine.activate("j-k-l-a"));
    let report = StatusReport::capture(&engine);
    assert_eq!(report.status_text, "Licensed");
    assert!(report.licensed);
    assert!(report.can_use_app);
}

#[test]
fn report_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = LicenseConfig::from_json(test_config_json()).unwrap();
    let engine = open_engine(&config, Some(dir.path()), week_10_clock()).unwrap();

    let report = StatusReport::capture(&engine);
    let json = serde_json::to_string(&report).unwrap();
    let parsed: StatusReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);
}
