// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::PipelineError;
use crate::snapshot::SnapshotEngine;
use bh_core::test_support::{file_changed_event, validated_event};
use bh_core::{CorrelationId, FakeClock};
use bh_storage::EventLog;
use std::sync::Arc;

fn captured() -> CapturedError {
    let clock = FakeClock::new();
    let log = Arc::new(EventLog::new(clock.clone()));
    log.append(CorrelationId::new(), None, file_changed_event("TestService"));
    log.append(CorrelationId::new(), None, validated_event("TestService"));
    SnapshotEngine::new(log, clock, 10)
        .capture(PipelineError::NullReference("metadata slot".to_string()))
}

#[test]
fn markdown_has_given_when_then() {
    let artifact = generate(Dialect::Markdown, &captured());

    let given = artifact.find("### Given").unwrap();
    let when = artifact.find("### When").unwrap();
    let then = artifact.find("### Then").unwrap();
    assert!(given < when && when < then);

    // When replays the recorded events in order
    assert!(artifact.contains("1. replay class:file_changed"));
    assert!(artifact.contains("2. replay bytecode:validated"));
    // Then names the classification and message fragment
    assert!(artifact.contains("`NULL_REFERENCE`"));
    assert!(artifact.contains("metadata slot"));
}

#[test]
fn markdown_with_empty_history_still_has_when() {
    let clock = FakeClock::new();
    let log = Arc::new(EventLog::new(clock.clone()));
    let captured = SnapshotEngine::new(log, clock, 10)
        .capture(PipelineError::Other("boom".to_string()));

    let artifact = generate(Dialect::Markdown, &captured);
    assert!(artifact.contains("no prior events"));
}

#[test]
fn rust_test_is_a_plausible_test_fn() {
    let captured = captured();
    let artifact = generate(Dialect::RustTest, &captured);

    assert!(artifact.starts_with("#[test]\n"));
    assert!(artifact.contains("fn reproduces_failure_"));
    // Given / When / Then structure as comments
    assert!(artifact.contains("// Given"));
    assert!(artifact.contains("// When"));
    assert!(artifact.contains("// Then"));
    // Replays through the log and pins the recorded expectation
    assert!(artifact.contains("EventLog::with_history"));
    assert!(artifact.contains("assert_eq!(log.len(), 2);"));
    assert!(artifact.contains("ErrorClass::NullReference"));
    assert!(artifact.contains("NULL_REFERENCE"));
    // Balanced braces, since the artifact is source text
    let open = artifact.matches('{').count();
    let close = artifact.matches('}').count();
    assert_eq!(open, close);
}

#[test]
fn embedded_event_json_round_trips() {
    let captured = captured();
    let artifact = generate(Dialect::RustTest, &captured);

    // Each embedded line is a Rust string literal holding the record JSON;
    // unescape via serde (a Rust debug string is JSON-string compatible
    // here) and parse it back.
    let mut seen = 0;
    for line in artifact.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("\"{") {
            let literal = trimmed.trim_end_matches(',');
            let unescaped: String = serde_json::from_str(literal).unwrap();
            let record: bh_core::EventRecord = serde_json::from_str(&unescaped).unwrap();
            assert_eq!(record.seq, captured.snapshot.events[seen].seq);
            seen += 1;
        }
    }
    assert_eq!(seen, 2);
}

#[test]
fn test_name_is_a_valid_identifier() {
    let artifact = generate(Dialect::RustTest, &captured());
    let name_line = artifact.lines().nth(1).unwrap_or_default();
    let name = name_line.trim_start_matches("fn ").trim_end_matches("() {");
    assert!(!name.is_empty());
    assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    assert!(!name.starts_with(|c: char| c.is_ascii_digit()));
}
