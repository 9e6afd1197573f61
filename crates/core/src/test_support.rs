// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

// Test factories fail fast on contradictory inputs
#![allow(clippy::expect_used)]

use crate::classify::ChangeClassification;
use crate::event::{Aggregate, CorrelationId, DomainEvent, EventId, EventRecord};
use crate::metadata::{ClassMetadata, FieldSig, MethodSig};
use crate::update::{UpdateMethod, UpdateOutcome};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for domain types.
pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_update_method() -> impl Strategy<Value = UpdateMethod> {
        prop_oneof![
            Just(UpdateMethod::Automatic),
            Just(UpdateMethod::Reflection),
            Just(UpdateMethod::ProxyRefresh),
            Just(UpdateMethod::FactoryReset),
            Just(UpdateMethod::NoUpdate),
        ]
    }

    pub fn arb_classification() -> impl Strategy<Value = ChangeClassification> {
        prop_oneof![
            Just(ChangeClassification::MethodBodyOnly),
            Just(ChangeClassification::SafeAdditive),
            Just(ChangeClassification::SchemaIncompatible),
            Just(ChangeClassification::Unknown),
        ]
    }

    pub fn arb_event() -> impl Strategy<Value = DomainEvent> {
        let class = "[A-Z][a-z]{2,8}";
        prop_oneof![
            (class, 1u64..1_000_000, 1u64..10_000).prop_map(|(name, ms, size)| {
                DomainEvent::ClassFileChanged {
                    path: format!("/classes/{name}.class").into(),
                    class_name: name.into(),
                    size_bytes: size,
                    modified_at_ms: ms,
                }
            }),
            (class, any::<bool>()).prop_map(|(name, safe)| DomainEvent::BytecodeValidated {
                path: format!("/classes/{name}.class").into(),
                class_name: name.into(),
                safe,
                detail: "generated".into(),
            }),
            (class, arb_classification()).prop_map(|(name, classification)| {
                DomainEvent::BytecodeRejected {
                    path: format!("/classes/{name}.class").into(),
                    class_name: name.into(),
                    classification,
                    detail: "generated".into(),
                }
            }),
            (class, 0u32..10).prop_map(|(name, instances)| {
                DomainEvent::ClassRedefinitionSucceeded {
                    path: format!("/classes/{name}.class").into(),
                    class_name: name.into(),
                    affected_instances: instances,
                    detail: "generated".into(),
                    duration_ms: 1,
                }
            }),
        ]
    }

    pub fn arb_record() -> impl Strategy<Value = EventRecord> {
        (arb_event(), 0u64..1_000, 1u64..1_000_000).prop_map(|(event, seq, epoch_ms)| {
            let class = event.class_name().unwrap_or("none").to_string();
            EventRecord {
                id: EventId::new(),
                seq,
                correlation: CorrelationId::new(),
                caused_by: None,
                aggregate: Aggregate::class(class),
                epoch_ms,
                event,
            }
        })
    }
}

// ── Event factory functions ─────────────────────────────────────────────

pub fn file_changed_event(class_name: &str) -> DomainEvent {
    DomainEvent::ClassFileChanged {
        path: format!("/tmp/classes/{class_name}.class").into(),
        class_name: class_name.into(),
        size_bytes: 512,
        modified_at_ms: 1_000_000,
    }
}

pub fn validated_event(class_name: &str) -> DomainEvent {
    DomainEvent::BytecodeValidated {
        path: format!("/tmp/classes/{class_name}.class").into(),
        class_name: class_name.into(),
        safe: true,
        detail: "method bodies only".into(),
    }
}

pub fn rejected_event(class_name: &str, detail: &str) -> DomainEvent {
    DomainEvent::BytecodeRejected {
        path: format!("/tmp/classes/{class_name}.class").into(),
        class_name: class_name.into(),
        classification: ChangeClassification::SchemaIncompatible,
        detail: detail.into(),
    }
}

pub fn succeeded_event(class_name: &str) -> DomainEvent {
    DomainEvent::ClassRedefinitionSucceeded {
        class_name: class_name.into(),
        path: format!("/tmp/classes/{class_name}.class").into(),
        affected_instances: 0,
        detail: "redefined".into(),
        duration_ms: 3,
    }
}

pub fn updated_event(class_name: &str, method: UpdateMethod, updated: u32, total: u32, failed: u32) -> DomainEvent {
    let outcome = UpdateOutcome::new(class_name, method, updated, total, failed, 1, None)
        .expect("test factories use consistent counts");
    DomainEvent::InstancesUpdated { outcome }
}

/// Wrap an event in a minimal envelope for log-free tests.
pub fn record(seq: u64, event: DomainEvent) -> EventRecord {
    let class = event.class_name().unwrap_or("none").to_string();
    EventRecord {
        id: EventId::new(),
        seq,
        correlation: CorrelationId::from_string("cor-test"),
        caused_by: None,
        aggregate: Aggregate::class(class),
        epoch_ms: 1_000_000 + seq,
        event,
    }
}

/// Metadata for a simple service class with two methods and one field.
pub fn service_metadata(class_name: &str) -> ClassMetadata {
    ClassMetadata {
        class_name: class_name.into(),
        superclass: Some("java.lang.Object".into()),
        interfaces: Default::default(),
        fields: vec![FieldSig::new("count", "I", 0x0002)],
        methods: vec![
            MethodSig::new("<init>", "()V", 0x0001),
            MethodSig::new("serve", "()V", 0x0001),
        ],
    }
}
