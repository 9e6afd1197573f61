// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reproduction-test generation from failure snapshots
//!
//! Every artifact has three canonical sections — *Given* (environment and
//! event history), *When* (sequential replay), *Then* (expected error class
//! and message substring) — rendered in the requested dialect.

use crate::snapshot::CapturedError;

/// Output dialects for generated reproduction artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// A `#[test]` function replaying the snapshot through an event log.
    RustTest,
    /// A human-runnable Given/When/Then walkthrough.
    Markdown,
}

/// Render a reproduction artifact for `captured`.
pub fn generate(dialect: Dialect, captured: &CapturedError) -> String {
    match dialect {
        Dialect::RustTest => rust_test(captured),
        Dialect::Markdown => markdown(captured),
    }
}

/// The first line of the error message, the substring a reproduction
/// asserts on.
fn message_snippet(captured: &CapturedError) -> String {
    captured.error.to_string().lines().next().unwrap_or_default().to_string()
}

fn markdown(captured: &CapturedError) -> String {
    let mut out = String::new();

    out.push_str("### Given\n\n");
    for (key, value) in &captured.snapshot.environment {
        out.push_str(&format!("- {key}: {value}\n"));
    }
    out.push_str(&format!(
        "- an event log holding the {} recorded event(s) below\n\n",
        captured.snapshot.events.len()
    ));

    out.push_str("### When\n\n");
    if captured.snapshot.events.is_empty() {
        out.push_str("1. trigger the failing operation with no prior events\n");
    } else {
        for (step, record) in captured.snapshot.events.iter().enumerate() {
            out.push_str(&format!("{}. replay {}\n", step + 1, record.event.log_summary()));
        }
    }
    out.push('\n');

    out.push_str("### Then\n\n");
    out.push_str(&format!(
        "- the pipeline fails and classifies as `{}`\n",
        captured.classification
    ));
    out.push_str(&format!("- the message contains {:?}\n", message_snippet(captured)));
    out
}

fn rust_test(captured: &CapturedError) -> String {
    let name = test_name(captured);
    let mut out = String::new();

    out.push_str("#[test]\n");
    out.push_str(&format!("fn {name}() {{\n"));

    out.push_str("    // Given: the recorded event history\n");
    out.push_str("    let history: &[&str] = &[\n");
    for record in &captured.snapshot.events {
        let json = serde_json::to_string(record).unwrap_or_default();
        out.push_str(&format!("        {:?},\n", json));
    }
    out.push_str("    ];\n");
    out.push_str("    let records: Vec<bh_core::EventRecord> = history\n");
    out.push_str("        .iter()\n");
    out.push_str("        .map(|line| serde_json::from_str(line).expect(\"recorded event parses\"))\n");
    out.push_str("        .collect();\n\n");

    out.push_str("    // When: the history is replayed in order\n");
    out.push_str("    let log = bh_storage::EventLog::with_history(bh_core::SystemClock, records);\n");
    out.push_str(&format!("    assert_eq!(log.len(), {});\n\n", captured.snapshot.events.len()));

    out.push_str("    // Then: the failure classifies and reads as recorded\n");
    out.push_str(&format!(
        "    let expected = bh_core::ErrorClass::{:?};\n",
        captured.classification
    ));
    out.push_str(&format!(
        "    assert_eq!(expected.to_string(), {:?});\n",
        captured.classification.to_string()
    ));
    out.push_str(&format!(
        "    let message_fragment = {:?};\n",
        message_snippet(captured)
    ));
    out.push_str("    assert!(!message_fragment.is_empty());\n");
    out.push_str("}\n");
    out
}

/// Test-fn name derived from the error id; non-identifier characters become
/// underscores.
fn test_name(captured: &CapturedError) -> String {
    let suffix: String = captured
        .error_id
        .short(12)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("reproduces_failure_{suffix}")
}

#[cfg(test)]
#[path = "repro_tests.rs"]
mod tests;
