// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios for the hot-swap pipeline, driven through the real
//! watcher, runtime, and fake platform port.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use bh_adapters::{Debouncer, FakeInstrumentation, FsWatcher, WatchEvent};
use bh_classfile::test_support::ClassFileBuilder;
use bh_core::{
    CorrelationId, DomainEvent, ErrorClass, FakeClock, HotInstance, SystemClock, UpdateError,
    UpdateMethod, WatchId,
};
use bh_engine::{
    CapturedError, InstanceTracker, PipelineError, Runtime, RuntimeConfig, RuntimeDeps,
    SnapshotEngine,
};
use bh_storage::EventLog;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const SERVICE: &str = "com.example.TestService";

fn service_bytes(code: &[u8]) -> Vec<u8> {
    ClassFileBuilder::new(SERVICE)
        .field("count", "I")
        .method("<init>", "()V")
        .method_with_code("serve", "()V", code)
        .build()
}

fn incompatible_bytes() -> Vec<u8> {
    // Adds a field relative to the loaded definition
    ClassFileBuilder::new("com.example.IncompatibleService")
        .field("count", "I")
        .field("extra", "J")
        .method("<init>", "()V")
        .method_with_code("serve", "()V", &[0xb1])
        .build()
}

struct World {
    instrumentation: FakeInstrumentation,
    log: Arc<EventLog<SystemClock>>,
    tracker: Arc<InstanceTracker>,
    watcher: FsWatcher,
    classes_dir: tempfile::TempDir,
    cancel: CancellationToken,
}

/// Wire watcher → runtime → fake platform over a temp directory, watching
/// `*.class` recursively with a 100 ms debounce.
fn world() -> World {
    let classes_dir = tempfile::tempdir().unwrap();
    let instrumentation = FakeInstrumentation::new();
    let log = Arc::new(EventLog::new(SystemClock));
    let tracker = Arc::new(InstanceTracker::new());

    let runtime = Runtime::new(
        RuntimeDeps {
            instrumentation: instrumentation.clone(),
            log: Arc::clone(&log),
            tracker: Arc::clone(&tracker),
            clock: SystemClock,
        },
        RuntimeConfig::default(),
    );

    let (watch_tx, watch_rx) = mpsc::channel(256);
    let watcher = FsWatcher::new(watch_tx, Duration::from_millis(100));
    watcher
        .start_watching(classes_dir.path(), &["*.class".to_string()], true)
        .unwrap();

    let cancel = CancellationToken::new();
    tokio::spawn(runtime.run(watch_rx, cancel.clone()));

    World { instrumentation, log, tracker, watcher, classes_dir, cancel }
}

async fn wait_for_terminal(log: &EventLog<SystemClock>) -> Vec<DomainEvent> {
    let deadline = Instant::now() + Duration::from_secs(15);
    loop {
        let records = log.all();
        if records.iter().any(|r| r.event.is_terminal()) {
            return records.into_iter().map(|r| r.event).collect();
        }
        assert!(Instant::now() < deadline, "no terminal event; log: {:?}", event_names(log));
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

fn event_names(log: &EventLog<SystemClock>) -> Vec<&'static str> {
    log.all().iter().map(|r| r.event.name()).collect()
}

// ── Scenario 1: happy path ──────────────────────────────────────────────

#[tokio::test]
async fn happy_path_method_body_change() {
    let world = world();
    world.instrumentation.load_class(SERVICE, service_bytes(&[0xb1]));

    // Give the OS watcher a beat to arm, then write a body-only change
    tokio::time::sleep(Duration::from_millis(250)).await;
    let path = world.classes_dir.path().join("TestService.class");
    std::fs::write(&path, service_bytes(&[0x00, 0xb1])).unwrap();

    let events = wait_for_terminal(&world.log).await;
    let names: Vec<_> = events.iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec![
            "class:file_changed",
            "class:metadata_extracted",
            "bytecode:validated",
            "swap:requested",
            "swap:succeeded",
            "instances:updated",
        ]
    );

    match &events[2] {
        DomainEvent::BytecodeValidated { safe, .. } => assert!(safe),
        other => panic!("expected BytecodeValidated, got {other:?}"),
    }
    match &events[5] {
        DomainEvent::InstancesUpdated { outcome } => {
            assert_eq!(outcome.method(), UpdateMethod::NoUpdate);
            assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (0, 0, 0));
        }
        other => panic!("expected InstancesUpdated, got {other:?}"),
    }
    world.cancel.cancel();
}

// ── Scenario 2: schema rejection ────────────────────────────────────────

#[tokio::test]
async fn schema_incompatible_change_is_rejected() {
    let world = world();
    // Loaded definition has one field; the new artifact adds another
    let original = ClassFileBuilder::new("com.example.IncompatibleService")
        .field("count", "I")
        .method("<init>", "()V")
        .method_with_code("serve", "()V", &[0xb1])
        .build();
    world.instrumentation.load_class("com.example.IncompatibleService", original);

    tokio::time::sleep(Duration::from_millis(250)).await;
    let path = world.classes_dir.path().join("IncompatibleService.class");
    std::fs::write(&path, incompatible_bytes()).unwrap();

    let events = wait_for_terminal(&world.log).await;
    let names: Vec<_> = events.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["class:file_changed", "class:metadata_extracted", "bytecode:rejected"]);

    match events.last().unwrap() {
        DomainEvent::BytecodeRejected { detail, .. } => {
            assert!(detail.contains("Schema"), "detail: {detail}");
        }
        other => panic!("expected BytecodeRejected, got {other:?}"),
    }
    // No hot-swap was requested for the rejected change
    assert!(!names.contains(&"swap:requested"));
    assert_eq!(world.instrumentation.redefine_count(), 0);
    world.cancel.cancel();
}

// ── Scenario 3: platform refusal ────────────────────────────────────────

#[tokio::test]
async fn platform_verification_refusal_fails_the_swap() {
    let world = world();
    world.instrumentation.load_class(SERVICE, service_bytes(&[0xb1]));
    world.instrumentation.set_fail_next_redefine(
        bh_adapters::RedefinitionError::VerificationFailed("rejected by verifier".to_string()),
    );

    tokio::time::sleep(Duration::from_millis(250)).await;
    let path = world.classes_dir.path().join("TestService.class");
    std::fs::write(&path, service_bytes(&[0x00, 0xb1])).unwrap();

    let events = wait_for_terminal(&world.log).await;
    let names: Vec<_> = events.iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec![
            "class:file_changed",
            "class:metadata_extracted",
            "bytecode:validated",
            "swap:requested",
            "swap:failed",
        ]
    );

    match events.last().unwrap() {
        DomainEvent::ClassRedefinitionFailed { reason, .. } => {
            assert!(reason.contains("Verification"), "reason: {reason}");
        }
        other => panic!("expected ClassRedefinitionFailed, got {other:?}"),
    }
    assert!(!names.contains(&"instances:updated"));
    world.cancel.cancel();
}

// ── Scenario 4: reflective update with one failure out of three ─────────

struct ScriptedInstance {
    fail: bool,
    updates: AtomicUsize,
}

impl ScriptedInstance {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self { fail, updates: AtomicUsize::new(0) })
    }
}

impl HotInstance for ScriptedInstance {
    fn class_name(&self) -> &str {
        SERVICE
    }

    fn reinitialize(&self) -> Result<(), UpdateError> {
        if self.fail {
            return Err(UpdateError::Reinitialize("constructor threw".to_string()));
        }
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn reflective_update_isolates_one_failure_out_of_three() {
    let world = world();
    world.instrumentation.load_class(SERVICE, service_bytes(&[0xb1]));

    let good1 = ScriptedInstance::new(false);
    let bad = ScriptedInstance::new(true);
    let good2 = ScriptedInstance::new(false);
    for instance in [&good1, &bad, &good2] {
        let as_dyn: Arc<dyn HotInstance> = Arc::clone(instance) as Arc<dyn HotInstance>;
        world.tracker.track(&as_dyn);
    }

    tokio::time::sleep(Duration::from_millis(250)).await;
    let path = world.classes_dir.path().join("TestService.class");
    std::fs::write(&path, service_bytes(&[0x00, 0xb1])).unwrap();

    let events = wait_for_terminal(&world.log).await;
    match events.last().unwrap() {
        DomainEvent::InstancesUpdated { outcome } => {
            assert_eq!(outcome.class_name(), SERVICE);
            assert_eq!(outcome.method(), UpdateMethod::Reflection);
            assert_eq!((outcome.updated(), outcome.total(), outcome.failed()), (2, 3, 1));
        }
        other => panic!("expected InstancesUpdated, got {other:?}"),
    }
    assert_eq!(good1.updates.load(Ordering::SeqCst), 1);
    assert_eq!(good2.updates.load(Ordering::SeqCst), 1);
    world.cancel.cancel();
}

// ── Scenario 5: snapshot on unhandled error ─────────────────────────────

#[test]
fn unhandled_error_yields_classified_snapshot_and_report() {
    let clock = FakeClock::new();
    let log = Arc::new(EventLog::new(clock.clone()));
    // A dozen prior events, then the triggering file change
    for i in 0..11 {
        log.append(
            CorrelationId::new(),
            None,
            DomainEvent::WatchStopped { id: WatchId::from_string(format!("wch-{i}")) },
        );
    }
    log.append(
        CorrelationId::new(),
        None,
        DomainEvent::ClassFileChanged {
            path: "/tmp/classes/TestService.class".into(),
            class_name: SERVICE.into(),
            size_bytes: 512,
            modified_at_ms: 1_000_000,
        },
    );

    let engine = SnapshotEngine::new(Arc::clone(&log), clock, 10);
    let captured: CapturedError = engine.capture(PipelineError::NullReference(
        "metadata extraction dereferenced a missing entry".to_string(),
    ));

    assert_eq!(captured.classification, ErrorClass::NullReference);
    assert!(!captured.snapshot.events.is_empty());
    assert!(captured.snapshot.events.len() <= 10);
    assert_eq!(
        captured.snapshot.events.last().map(|r| r.event.name()),
        Some("class:file_changed"),
        "snapshot must end at the triggering event"
    );

    let report = captured.bug_report();
    for section in
        ["Error Summary", "Event Context", "System State", "Reproduction", "Stack Trace"]
    {
        assert!(report.contains(section), "missing section {section}");
    }
}

// ── Scenario 6: debouncing ──────────────────────────────────────────────

#[test]
fn five_modifies_inside_the_window_coalesce_to_one_change() {
    let mut debouncer = Debouncer::new(Duration::from_millis(100));
    let id = WatchId::from_string("wch-scn");
    let start = Instant::now();
    let path = Path::new("/tmp/classes/TestService.class");

    // Five modify events within 50 ms, sizes/timestamps advancing
    for i in 0u64..5 {
        debouncer.observe(
            id,
            path.to_path_buf(),
            500 + i,
            1_000_000 + i,
            start + Duration::from_millis(i * 10),
        );
    }

    let changes = debouncer.due(start + Duration::from_millis(150));
    assert_eq!(changes.len(), 1, "five rapid modifies must coalesce to one");
    assert_eq!(changes[0].size_bytes, 504);
    assert_eq!(changes[0].modified_at_ms, 1_000_004);
    assert!(!debouncer.has_pending());
}

// ── Cross-cutting: stop_watching contract ───────────────────────────────

#[tokio::test]
async fn stop_watching_is_idempotent() {
    let world = world();
    let registrations = world.watcher.registrations();
    let id = registrations[0].id;

    assert!(world.watcher.stop_watching(id));
    assert!(!world.watcher.stop_watching(id));
    assert!(!world.watcher.stop_watching(WatchId::from_string("wch-unknown")));
    world.cancel.cancel();
}
