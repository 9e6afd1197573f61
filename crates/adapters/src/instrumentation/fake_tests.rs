// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::instrumentation::UnsupportedInstrumentation;

#[tokio::test]
async fn find_returns_loaded_classes_only() {
    let fake = FakeInstrumentation::new();
    fake.load_class("com.example.A", vec![1, 2, 3]);

    let found = fake.find_loaded_class("com.example.A").await.unwrap();
    assert_eq!(found.name, "com.example.A");
    assert_eq!(found.bytecode, vec![1, 2, 3]);

    assert!(fake.find_loaded_class("com.example.Missing").await.is_none());
}

#[tokio::test]
async fn redefine_replaces_stored_bytecode() {
    let fake = FakeInstrumentation::new();
    fake.load_class("A", vec![1]);

    let class = fake.find_loaded_class("A").await.unwrap();
    fake.redefine(&class, &[9, 9]).await.unwrap();

    assert_eq!(fake.loaded_bytecode("A"), Some(vec![9, 9]));
    assert_eq!(fake.redefine_count(), 1);
}

#[tokio::test]
async fn scripted_failure_fires_once() {
    let fake = FakeInstrumentation::new();
    fake.load_class("A", vec![1]);
    fake.set_fail_next_redefine(RedefinitionError::VerificationFailed("bad stack map".into()));

    let class = fake.find_loaded_class("A").await.unwrap();
    let err = fake.redefine(&class, &[2]).await.unwrap_err();
    assert!(matches!(err, RedefinitionError::VerificationFailed(_)));
    // Failed attempt must not change the stored definition
    assert_eq!(fake.loaded_bytecode("A"), Some(vec![1]));

    // Next call succeeds
    fake.redefine(&class, &[3]).await.unwrap();
    assert_eq!(fake.loaded_bytecode("A"), Some(vec![3]));
}

#[tokio::test]
async fn redefining_unloaded_class_reports_not_found() {
    let fake = FakeInstrumentation::new();
    let ghost = LoadedClass { name: "Ghost".into(), bytecode: vec![] };
    let err = fake.redefine(&ghost, &[1]).await.unwrap_err();
    assert!(matches!(err, RedefinitionError::ClassNotFound(_)));
}

#[tokio::test]
async fn report_flags_are_scriptable() {
    let fake = FakeInstrumentation::new();
    fake.load_class("A", vec![1]);
    fake.set_report(true, true);

    let class = fake.find_loaded_class("A").await.unwrap();
    let report = fake.redefine(&class, &[2]).await.unwrap();
    assert!(report.layout_preserved);
    assert!(report.methods_migrated);
}

#[test]
fn unsupported_instrumentation_never_simulates_success() {
    let port = UnsupportedInstrumentation;
    assert!(!port.is_redefinition_supported());

    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    runtime.block_on(async {
        assert!(port.find_loaded_class("A").await.is_none());
        let ghost = LoadedClass { name: "A".into(), bytecode: vec![] };
        let err = port.redefine(&ghost, &[1]).await.unwrap_err();
        assert!(matches!(err, RedefinitionError::UnsupportedChange(_)));
    });
}

#[test]
fn error_reasons_are_stable_names() {
    assert_eq!(RedefinitionError::UnsupportedChange("x".into()).reason(), "UnsupportedChange");
    assert_eq!(RedefinitionError::VerificationFailed("x".into()).reason(), "VerificationFailed");
    assert_eq!(RedefinitionError::ClassNotFound("x".into()).reason(), "ClassNotFound");
    assert_eq!(RedefinitionError::Platform("x".into()).reason(), "PlatformError");
}
