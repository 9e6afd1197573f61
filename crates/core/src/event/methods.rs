// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event dispatch methods — name, log summary, class extraction

use super::{Aggregate, DomainEvent};

impl DomainEvent {
    /// The aggregate this event belongs to: the class it concerns, or the
    /// watch registration for watch-lifecycle events.
    pub fn aggregate(&self) -> Aggregate {
        match self {
            DomainEvent::WatchStarted { id, .. }
            | DomainEvent::WatchStopped { id }
            | DomainEvent::WatchOverflow { id, .. } => Aggregate::watch(*id),
            other => Aggregate::class(other.class_name().unwrap_or("<unknown>")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::ClassFileChanged { .. } => "class:file_changed",
            DomainEvent::ClassMetadataExtracted { .. } => "class:metadata_extracted",
            DomainEvent::BytecodeValidated { .. } => "bytecode:validated",
            DomainEvent::BytecodeRejected { .. } => "bytecode:rejected",
            DomainEvent::HotSwapRequested { .. } => "swap:requested",
            DomainEvent::ClassRedefinitionSucceeded { .. } => "swap:succeeded",
            DomainEvent::ClassRedefinitionFailed { .. } => "swap:failed",
            DomainEvent::InstancesUpdated { .. } => "instances:updated",
            DomainEvent::WatchStarted { .. } => "watch:started",
            DomainEvent::WatchStopped { .. } => "watch:stopped",
            DomainEvent::WatchOverflow { .. } => "watch:overflow",
        }
    }

    /// The class this event concerns, when it concerns one.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            DomainEvent::ClassFileChanged { class_name, .. }
            | DomainEvent::BytecodeValidated { class_name, .. }
            | DomainEvent::BytecodeRejected { class_name, .. }
            | DomainEvent::HotSwapRequested { class_name, .. }
            | DomainEvent::ClassRedefinitionSucceeded { class_name, .. }
            | DomainEvent::ClassRedefinitionFailed { class_name, .. } => Some(class_name),
            DomainEvent::ClassMetadataExtracted { metadata, .. } => Some(&metadata.class_name),
            DomainEvent::InstancesUpdated { outcome } => Some(outcome.class_name()),
            DomainEvent::WatchStarted { .. }
            | DomainEvent::WatchStopped { .. }
            | DomainEvent::WatchOverflow { .. } => None,
        }
    }

    /// Whether this event closes a pipeline state machine.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DomainEvent::BytecodeRejected { .. }
                | DomainEvent::ClassRedefinitionFailed { .. }
                | DomainEvent::InstancesUpdated { .. }
        )
    }

    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            DomainEvent::ClassFileChanged { path, class_name, size_bytes, .. } => {
                format!("{t} class={class_name} path={} size={size_bytes}", path.display())
            }
            DomainEvent::ClassMetadataExtracted { metadata, .. } => format!(
                "{t} class={} methods={} fields={}",
                metadata.class_name,
                metadata.methods.len(),
                metadata.fields.len()
            ),
            DomainEvent::BytecodeValidated { class_name, safe, .. } => {
                format!("{t} class={class_name} safe={safe}")
            }
            DomainEvent::BytecodeRejected { class_name, classification, .. } => {
                format!("{t} class={class_name} classification={classification}")
            }
            DomainEvent::HotSwapRequested { class_name, request_id, new_bytes, .. } => {
                format!("{t} class={class_name} request={request_id} bytes={}", new_bytes.len())
            }
            DomainEvent::ClassRedefinitionSucceeded {
                class_name, affected_instances, duration_ms, ..
            } => {
                format!("{t} class={class_name} instances={affected_instances} elapsed_ms={duration_ms}")
            }
            DomainEvent::ClassRedefinitionFailed { class_name, reason, .. } => {
                format!("{t} class={class_name} reason={reason}")
            }
            DomainEvent::InstancesUpdated { outcome } => format!(
                "{t} class={} method={} updated={}/{} failed={}",
                outcome.class_name(),
                outcome.method(),
                outcome.updated(),
                outcome.total(),
                outcome.failed()
            ),
            DomainEvent::WatchStarted { id, root, recursive, .. } => {
                format!("{t} id={id} root={} recursive={recursive}", root.display())
            }
            DomainEvent::WatchStopped { id } => format!("{t} id={id}"),
            DomainEvent::WatchOverflow { id, root, .. } => {
                format!("{t} id={id} root={}", root.display())
            }
        }
    }
}
