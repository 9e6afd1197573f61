// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert!(config.watch.roots.is_empty());
    assert_eq!(config.watch.patterns, vec!["*.class"]);
    assert!(config.watch.recursive);
    assert_eq!(config.watch.debounce_ms, 100);
    assert_eq!(config.snapshot.window, 10);
    assert_eq!(config.redefine.timeout_ms, 5_000);
    assert_eq!(config.update.enabled_strategies.len(), 5);
}

#[test]
fn empty_toml_is_default() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = Config::from_toml_str(
        r#"
        [watch]
        roots = ["/tmp/classes"]
        debounce_ms = 250

        [redefine]
        timeout_ms = 1000
        "#,
    )
    .unwrap();
    assert_eq!(config.watch.roots, vec![PathBuf::from("/tmp/classes")]);
    assert_eq!(config.watch.debounce_ms, 250);
    assert_eq!(config.watch.patterns, vec!["*.class"]);
    assert_eq!(config.redefine.timeout_ms, 1_000);
    assert_eq!(config.snapshot.window, 10);
}

#[test]
fn strategies_parse_from_wire_names() {
    let config = Config::from_toml_str(
        r#"
        [update]
        enabled_strategies = ["REFLECTION", "NO_UPDATE"]
        "#,
    )
    .unwrap();
    assert!(config.strategy_enabled(UpdateMethod::Reflection));
    assert!(config.strategy_enabled(UpdateMethod::NoUpdate));
    assert!(!config.strategy_enabled(UpdateMethod::Automatic));
}

#[test]
fn unknown_strategy_fails_parse() {
    let result = Config::from_toml_str(
        r#"
        [update]
        enabled_strategies = ["EAGER"]
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn unknown_field_fails_parse() {
    let result = Config::from_toml_str(
        r#"
        [watch]
        rooots = ["/tmp"]
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bytehot.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[snapshot]\nwindow = 3").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.snapshot.window, 3);
}

#[test]
fn load_missing_file_reports_path() {
    let err = Config::load(Path::new("/nonexistent/bytehot.toml")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/bytehot.toml"));
}

#[test]
fn durations_convert_from_ms() {
    let config = Config::default();
    assert_eq!(config.debounce(), Duration::from_millis(100));
    assert_eq!(config.redefine_timeout(), Duration::from_millis(5_000));
}
