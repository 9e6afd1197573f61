// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain events for the ByteHot pipeline
//!
//! Every event is wrapped in an [`EventRecord`] envelope carrying identity,
//! causal linkage, and a monotonic timestamp. Events are appended once to
//! the event log and never mutated.

mod methods;

use crate::classify::ChangeClassification;
use crate::metadata::ClassMetadata;
use crate::swap::SwapRequestId;
use crate::update::UpdateOutcome;
use crate::watch::WatchId;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::path::PathBuf;

pub use crate::id::{CorrelationId, EventId};

/// The entity an event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub kind: SmolStr,
    pub id: SmolStr,
}

impl Aggregate {
    pub fn class(name: impl Into<SmolStr>) -> Self {
        Self { kind: SmolStr::new_static("class"), id: name.into() }
    }

    pub fn watch(id: WatchId) -> Self {
        Self { kind: SmolStr::new_static("watch"), id: SmolStr::new(id.as_str()) }
    }
}

/// Envelope around one domain event.
///
/// The envelope fields are stable across minor versions; payload fields may
/// be added but never removed or repurposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    /// Position in the log's total order. Assigned at append time.
    pub seq: u64,
    pub correlation: CorrelationId,
    /// The event this one causally follows, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<EventId>,
    pub aggregate: Aggregate,
    /// Monotonic non-decreasing wall-clock milliseconds.
    pub epoch_ms: u64,
    pub event: DomainEvent,
}

/// Events emitted by the hot-swap pipeline and the watch dispatcher.
///
/// Serializes with `{"type": "domain:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    // -- class file observation --
    #[serde(rename = "class:file_changed")]
    ClassFileChanged {
        path: PathBuf,
        class_name: SmolStr,
        size_bytes: u64,
        modified_at_ms: u64,
    },

    #[serde(rename = "class:metadata_extracted")]
    ClassMetadataExtracted { path: PathBuf, metadata: ClassMetadata },

    // -- validation --
    #[serde(rename = "bytecode:validated")]
    BytecodeValidated {
        path: PathBuf,
        class_name: SmolStr,
        safe: bool,
        detail: String,
    },

    #[serde(rename = "bytecode:rejected")]
    BytecodeRejected {
        path: PathBuf,
        class_name: SmolStr,
        classification: ChangeClassification,
        detail: String,
    },

    // -- redefinition --
    #[serde(rename = "swap:requested")]
    HotSwapRequested {
        request_id: SwapRequestId,
        path: PathBuf,
        class_name: SmolStr,
        /// Bytecode the platform currently holds; empty when unknown.
        original: Vec<u8>,
        new_bytes: Vec<u8>,
        original_sha256: String,
        new_sha256: String,
        reason: String,
    },

    #[serde(rename = "swap:succeeded")]
    ClassRedefinitionSucceeded {
        class_name: SmolStr,
        path: PathBuf,
        affected_instances: u32,
        detail: String,
        duration_ms: u64,
    },

    #[serde(rename = "swap:failed")]
    ClassRedefinitionFailed {
        class_name: SmolStr,
        path: PathBuf,
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        platform_error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recovery_hint: Option<String>,
    },

    // -- reconciliation --
    #[serde(rename = "instances:updated")]
    InstancesUpdated { outcome: UpdateOutcome },

    // -- watch lifecycle --
    #[serde(rename = "watch:started")]
    WatchStarted {
        id: WatchId,
        root: PathBuf,
        patterns: Vec<String>,
        recursive: bool,
    },

    #[serde(rename = "watch:stopped")]
    WatchStopped { id: WatchId },

    #[serde(rename = "watch:overflow")]
    WatchOverflow { id: WatchId, root: PathBuf, detail: String },
}

#[cfg(test)]
#[path = "../event_tests.rs"]
mod tests;
