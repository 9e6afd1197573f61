// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure capture: event-history snapshots, classification, bug reports

use crate::error::PipelineError;
use crate::repro::{self, Dialect};
use bh_core::{Clock, ErrorClass, EventRecord};
use bh_storage::EventLog;
use std::collections::BTreeMap;
use std::error::Error as _;
use std::sync::Arc;

/// Identifier family for captured failures.
pub enum ErrorTag {}

impl bh_core::id::IdTag for ErrorTag {
    const TAG: &'static str = "err-";
}

/// Stable identifier for one captured failure.
pub type ErrorId = bh_core::id::Id<ErrorTag>;

/// Bounded, ordered event history plus environment data, captured at an
/// error site. Immutable.
#[derive(Debug, Clone)]
pub struct EventSnapshot {
    /// Chronological; at most the configured window length.
    pub events: Vec<EventRecord>,
    /// Enumerated process facts; no host-runtime reflection involved.
    pub environment: BTreeMap<String, String>,
    pub thread: String,
    pub captured_at_ms: u64,
}

/// An unhandled pipeline error wrapped with everything needed to reproduce
/// it.
#[derive(Debug)]
pub struct CapturedError {
    pub error_id: ErrorId,
    pub classification: ErrorClass,
    pub snapshot: EventSnapshot,
    pub error: PipelineError,
}

impl CapturedError {
    /// Human-readable Markdown bug report.
    pub fn bug_report(&self) -> String {
        let mut out = String::new();
        out.push_str("## Error Summary\n\n");
        out.push_str(&format!("- id: `{}`\n", self.error_id));
        out.push_str(&format!("- classification: {}\n", self.classification));
        out.push_str(&format!("- message: {}\n\n", self.error));

        out.push_str("## Event Context\n\n");
        if self.snapshot.events.is_empty() {
            out.push_str("No events captured before the failure.\n\n");
        } else {
            for record in &self.snapshot.events {
                out.push_str(&format!(
                    "- seq {} at {} ms: {}\n",
                    record.seq,
                    record.epoch_ms,
                    record.event.log_summary()
                ));
            }
            out.push('\n');
        }

        out.push_str("## System State\n\n");
        out.push_str(&format!("- thread: {}\n", self.thread_or_unnamed()));
        for (key, value) in &self.snapshot.environment {
            out.push_str(&format!("- {key}: {value}\n"));
        }
        out.push_str(&format!("- captured_at_ms: {}\n\n", self.snapshot.captured_at_ms));

        out.push_str("## Reproduction\n\n");
        out.push_str(&repro::generate(Dialect::Markdown, self));
        out.push('\n');

        out.push_str("## Stack Trace\n\n");
        out.push_str(&format!("0: {}\n", self.error));
        let mut depth = 1;
        let mut source = self.error.source();
        while let Some(cause) = source {
            out.push_str(&format!("{depth}: {cause}\n"));
            depth += 1;
            source = cause.source();
        }

        out
    }

    fn thread_or_unnamed(&self) -> &str {
        if self.snapshot.thread.is_empty() {
            "<unnamed>"
        } else {
            &self.snapshot.thread
        }
    }
}

/// Classify an error by kind and message, first match wins.
pub fn classify_error(error: &PipelineError) -> ErrorClass {
    // Kind-based rules run on the variant; keyword rules on the rendered
    // message chain, lowercased.
    let message = error.to_string().to_lowercase();

    if matches!(error, PipelineError::Redefinition { .. })
        || message.contains("hot-swap")
        || message.contains("hotswap")
    {
        return ErrorClass::HotSwapFailure;
    }
    if matches!(error, PipelineError::TypeMismatch(_))
        || message.contains("type mismatch")
        || message.contains("cannot cast")
    {
        return ErrorClass::TypeMismatch;
    }
    if matches!(error, PipelineError::NullReference(_)) || message.contains("null") {
        return ErrorClass::NullReference;
    }
    if matches!(error, PipelineError::InvalidState(_))
        || message.contains("invalid state")
        || message.contains("illegal state")
    {
        return ErrorClass::InvalidState;
    }
    if matches!(error, PipelineError::Io { .. }) || message.contains("io error") {
        return ErrorClass::IoFailure;
    }
    ErrorClass::Unknown
}

/// Wraps unhandled pipeline errors with a replayable snapshot.
pub struct SnapshotEngine<C: Clock> {
    log: Arc<EventLog<C>>,
    clock: C,
    window: usize,
}

impl<C: Clock> SnapshotEngine<C> {
    pub fn new(log: Arc<EventLog<C>>, clock: C, window: usize) -> Self {
        Self { log, clock, window }
    }

    /// Capture the trailing event window and environment around `error`.
    pub fn capture(&self, error: PipelineError) -> CapturedError {
        let snapshot = EventSnapshot {
            events: self.log.recent(self.window),
            environment: environment_fingerprint(),
            thread: std::thread::current().name().unwrap_or_default().to_string(),
            captured_at_ms: self.clock.epoch_ms(),
        };
        let captured = CapturedError {
            error_id: ErrorId::new(),
            classification: classify_error(&error),
            snapshot,
            error,
        };
        tracing::error!(
            error_id = %captured.error_id,
            classification = %captured.classification,
            error = %captured.error,
            "pipeline failure captured"
        );
        captured
    }
}

/// The enumerated set of process facts included with every snapshot.
fn environment_fingerprint() -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("os".to_string(), std::env::consts::OS.to_string());
    env.insert("arch".to_string(), std::env::consts::ARCH.to_string());
    env.insert("family".to_string(), std::env::consts::FAMILY.to_string());
    env.insert("pid".to_string(), std::process::id().to_string());
    env.insert(
        "cwd".to_string(),
        std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "<unknown>".to_string()),
    );
    env
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
