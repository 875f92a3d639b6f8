use crate::api::{SnapshotSettings, UpgradeSettings};
use crate::defaults::default_snapshot;
use crate::loader::{load_snapshot, load_snapshot_with_options, LoadOptions};
use crate::model::{PolicySource, WindowSpec};
use crate::PolicyError;
use chrono::{NaiveTime, TimeZone, Utc};
use std::env;
use std::sync::{Mutex, OnceLock};
use upgrades_core_types::AddonId;

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn offline(paths: Vec<std::path::PathBuf>, cli: &[&str]) -> LoadOptions {
    LoadOptions {
        paths,
        include_env: false,
        cli_overrides: cli.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn default_snapshot_opens_early_morning_without_restrictions() {
    let snapshot = default_snapshot();
    assert_eq!(snapshot.window.start, hm(1, 0));
    assert_eq!(snapshot.window.end, hm(5, 0));
    assert!(snapshot.upgrade_policy().is_unrestricted());
}

#[test]
fn builtin_values_carry_provenance() {
    let snapshot = load_snapshot_with_options(&offline(Vec::new(), &[])).unwrap();
    assert_eq!(snapshot.rev, 1);
    assert_eq!(snapshot.source_of("window.start"), Some(PolicySource::Builtin));
    assert_eq!(snapshot.source_of("addons.blocked"), Some(PolicySource::Builtin));
}

#[test]
fn policy_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("policy.yaml");
    std::fs::write(
        &file_path,
        r#"window:
  start: "02:30"
  end: "04:00"
addons:
  allowed: [calendar, contacts]
  blocked:
    - contacts
"#,
    )
    .unwrap();

    let snapshot = load_snapshot_with_options(&offline(vec![file_path], &[])).unwrap();
    assert_eq!(snapshot.window.start, hm(2, 30));
    assert_eq!(snapshot.window.end, hm(4, 0));
    assert_eq!(snapshot.addons.allowed, vec!["calendar", "contacts"]);
    assert_eq!(snapshot.addons.blocked, vec!["contacts"]);
    assert_eq!(snapshot.source_of("addons.allowed"), Some(PolicySource::File));
    assert_eq!(snapshot.rev, 2);
}

#[test]
fn missing_policy_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot =
        load_snapshot_with_options(&offline(vec![dir.path().join("absent.yaml")], &[])).unwrap();
    assert_eq!(snapshot.rev, 1);
}

#[test]
fn unknown_policy_path_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("policy.yaml");
    std::fs::write(&file_path, "window:\n  length: 3\n").unwrap();

    let err = load_snapshot_with_options(&offline(vec![file_path], &[])).unwrap_err();
    assert!(matches!(err, PolicyError::UnsupportedPath(path) if path == "window.length"));
}

#[test]
fn malformed_time_is_rejected() {
    let err = load_snapshot_with_options(&offline(Vec::new(), &["window.start=25:99"])).unwrap_err();
    assert!(matches!(err, PolicyError::InvalidValue(_)));
}

#[test]
fn cli_overrides_accept_comma_lists_and_record_provenance() {
    let snapshot = load_snapshot_with_options(&offline(
        Vec::new(),
        &["addons.blocked=mail, news", "window.utc_offset_minutes=60"],
    ))
    .unwrap();
    assert_eq!(snapshot.addons.blocked, vec!["mail", "news"]);
    assert_eq!(snapshot.window.utc_offset_minutes, 60);
    assert_eq!(snapshot.source_of("addons.blocked"), Some(PolicySource::Cli));
}

#[test]
fn numeric_and_boolean_addon_ids_are_kept_as_text() {
    let snapshot = load_snapshot_with_options(&offline(
        Vec::new(),
        &["addons.blocked=2048", "addons.allowed=true"],
    ))
    .unwrap();
    assert_eq!(snapshot.addons.blocked, vec!["2048"]);
    assert_eq!(snapshot.addons.allowed, vec!["true"]);

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("policy.yaml");
    std::fs::write(&file_path, "addons:\n  blocked: [2048, mail, false]\n").unwrap();
    let snapshot = load_snapshot_with_options(&offline(vec![file_path], &[])).unwrap();
    assert_eq!(snapshot.addons.blocked, vec!["2048", "mail", "false"]);
}

#[test]
fn nested_list_entries_are_rejected() {
    let err = load_snapshot_with_options(&offline(Vec::new(), &[r#"addons.blocked=[["mail"]]"#]))
        .unwrap_err();
    assert!(matches!(err, PolicyError::InvalidValue(_)));
}

#[test]
fn empty_policy_sections_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("policy.yaml");
    std::fs::write(&file_path, "addons:\nwindow:\n  start: \"23:00\"\n").unwrap();

    let snapshot = load_snapshot_with_options(&offline(vec![file_path], &[])).unwrap();
    assert_eq!(snapshot.window.start, hm(23, 0));
    assert!(snapshot.addons.blocked.is_empty());
    assert_eq!(snapshot.source_of("addons.blocked"), Some(PolicySource::Builtin));
}

#[test]
fn cli_override_without_separator_is_rejected() {
    let err = load_snapshot_with_options(&offline(Vec::new(), &["addons.blocked"])).unwrap_err();
    assert!(matches!(err, PolicyError::Invalid(_)));
}

#[test]
fn env_overrides_apply_after_files() {
    let _guard = env_guard().lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("policy.yaml");
    std::fs::write(&file_path, "addons:\n  blocked: [mail]\n").unwrap();

    let key = "UU_POLICY__ADDONS__BLOCKED";
    env::set_var(key, r#"["news"]"#);
    let snapshot = load_snapshot(Some(&file_path)).expect("load snapshot");
    env::remove_var(key);

    assert_eq!(snapshot.addons.blocked, vec!["news"]);
    assert_eq!(snapshot.source_of("addons.blocked"), Some(PolicySource::Env));
}

#[test]
fn env_json_override_is_flattened() {
    let _guard = env_guard().lock().unwrap();
    env::set_var(
        "UU_POLICY_OVERRIDE_JSON",
        r#"{"window":{"start":"03:00","end":"03:30"}}"#,
    );
    let snapshot = load_snapshot(None).expect("load snapshot with json");
    env::remove_var("UU_POLICY_OVERRIDE_JSON");

    assert_eq!(snapshot.window.start, hm(3, 0));
    assert_eq!(snapshot.window.end, hm(3, 30));
    assert_eq!(snapshot.source_of("window.end"), Some(PolicySource::Env));
}

#[test]
fn same_day_window_resolves_on_reference_date() {
    let spec = WindowSpec {
        start: hm(1, 0),
        end: hm(5, 0),
        utc_offset_minutes: 0,
    };
    let reference = Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap();
    let window = spec.resolve(reference).unwrap();
    assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 3, 10, 1, 0, 0).unwrap());
    assert_eq!(window.end(), Utc.with_ymd_and_hms(2024, 3, 10, 5, 0, 0).unwrap());
    assert!(window.contains(reference));
}

#[test]
fn midnight_window_picks_occurrence_around_reference() {
    let spec = WindowSpec {
        start: hm(22, 0),
        end: hm(2, 0),
        utc_offset_minutes: 0,
    };
    assert!(spec.wraps_midnight());

    let late = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
    let window = spec.resolve(late).unwrap();
    assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 3, 10, 22, 0, 0).unwrap());
    assert_eq!(window.end(), Utc.with_ymd_and_hms(2024, 3, 11, 2, 0, 0).unwrap());
    assert!(window.contains(late));

    let early = Utc.with_ymd_and_hms(2024, 3, 10, 1, 0, 0).unwrap();
    let window = spec.resolve(early).unwrap();
    assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 3, 9, 22, 0, 0).unwrap());
    assert!(window.contains(early));

    let noon = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    assert!(!spec.resolve(noon).unwrap().contains(noon));
}

#[test]
fn offset_shifts_window_into_utc() {
    let spec = WindowSpec {
        start: hm(1, 0),
        end: hm(5, 0),
        utc_offset_minutes: 120,
    };
    let reference = Utc.with_ymd_and_hms(2024, 3, 10, 0, 30, 0).unwrap();
    let window = spec.resolve(reference).unwrap();
    assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 3, 9, 23, 0, 0).unwrap());
    assert_eq!(window.end(), Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap());
}

#[test]
fn out_of_range_offset_is_rejected() {
    let spec = WindowSpec {
        start: hm(1, 0),
        end: hm(5, 0),
        utc_offset_minutes: 24 * 60,
    };
    let reference = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
    assert!(matches!(spec.resolve(reference), Err(PolicyError::InvalidValue(_))));
}

#[test]
fn snapshot_settings_expose_policy_sets() {
    let snapshot = load_snapshot_with_options(&offline(
        Vec::new(),
        &["addons.allowed=calendar", "addons.blocked=[\"mail\"]"],
    ))
    .unwrap();
    let settings = SnapshotSettings::new(snapshot);
    assert_eq!(settings.revision(), 2);
    assert!(settings
        .allowed_addon_ids()
        .unwrap()
        .contains(&AddonId::from("calendar")));
    assert!(settings
        .blocked_addon_ids()
        .unwrap()
        .contains(&AddonId::from("mail")));
    let reference = Utc.with_ymd_and_hms(2024, 3, 10, 2, 0, 0).unwrap();
    assert!(settings.maintenance_window(reference).unwrap().contains(reference));
}

fn env_guard() -> &'static Mutex<()> {
    static ENV_GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_GUARD.get_or_init(|| Mutex::new(()))
}
