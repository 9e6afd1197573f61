// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline runtime
//!
//! Consumes watch events, reads artifacts, and drives analyzer → validator →
//! manager → updater, appending every emitted event to the log. Requests are
//! serialized per class via lanes (busy flag + FIFO queue per class name);
//! distinct classes proceed concurrently under a bounded worker budget.

use crate::manager::HotSwapManager;
use crate::snapshot::{classify_error, CapturedError, SnapshotEngine};
use crate::tracker::InstanceTracker;
use crate::updater::{InstanceUpdater, UpdatePolicy};
use crate::PipelineError;
use bh_adapters::{Instrumentation, WatchEvent};
use bh_classfile::ValidationPolicy;
use bh_core::{
    class_name_from_path, ChangeClassification, Clock, Config, CorrelationId, DomainEvent,
    EventId,
};
use bh_storage::EventLog;
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

/// Tuning for one runtime instance.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub snapshot_window: usize,
    pub redefine_timeout: Duration,
    pub validation: ValidationPolicy,
    pub update_policy: UpdatePolicy,
    /// Concurrent pipeline executions across all classes.
    pub workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            snapshot_window: 10,
            redefine_timeout: Duration::from_millis(5_000),
            validation: ValidationPolicy::default(),
            update_policy: UpdatePolicy::default(),
            workers: 4,
        }
    }
}

impl RuntimeConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            snapshot_window: config.snapshot.window,
            redefine_timeout: config.redefine_timeout(),
            validation: ValidationPolicy::default(),
            update_policy: UpdatePolicy { enabled: config.update.enabled_strategies.clone() },
            workers: 4,
        }
    }
}

/// Adapter dependencies for the runtime.
pub struct RuntimeDeps<I, C: Clock> {
    pub instrumentation: I,
    pub log: Arc<EventLog<C>>,
    pub tracker: Arc<InstanceTracker>,
    pub clock: C,
}

/// One debounced change waiting for (or in) a lane.
#[derive(Debug)]
struct PendingChange {
    path: PathBuf,
    size_bytes: u64,
    modified_at_ms: u64,
}

/// Shared pipeline stages for lane tasks.
struct Worker<I, C: Clock> {
    manager: HotSwapManager<I, C>,
    snapshot: SnapshotEngine<C>,
    log: Arc<EventLog<C>>,
    failures: parking_lot::Mutex<Option<mpsc::UnboundedSender<CapturedError>>>,
}

/// The pipeline driver.
pub struct Runtime<I, C: Clock> {
    worker: Arc<Worker<I, C>>,
    budget: Arc<Semaphore>,
}

impl<I, C> Runtime<I, C>
where
    I: Instrumentation + 'static,
    C: Clock + 'static,
{
    pub fn new(deps: RuntimeDeps<I, C>, config: RuntimeConfig) -> Self {
        let updater = Arc::new(InstanceUpdater::new(
            Arc::clone(&deps.tracker),
            config.update_policy.clone(),
            deps.clock.clone(),
        ));
        let manager = HotSwapManager::new(
            deps.instrumentation,
            Arc::clone(&deps.log),
            updater,
            deps.clock.clone(),
            config.validation,
            config.redefine_timeout,
        );
        let snapshot =
            SnapshotEngine::new(Arc::clone(&deps.log), deps.clock, config.snapshot_window);
        Self {
            worker: Arc::new(Worker {
                manager,
                snapshot,
                log: deps.log,
                failures: parking_lot::Mutex::new(None),
            }),
            budget: Arc::new(Semaphore::new(config.workers.max(1))),
        }
    }

    /// Receive captured failures (snapshot-bearing errors) as they happen.
    pub fn failure_channel(&self) -> mpsc::UnboundedReceiver<CapturedError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.worker.failures.lock() = Some(tx);
        rx
    }

    /// Record a known-good definition so the first change can be diffed.
    pub fn seed_baseline(&self, class_name: &str, bytecode: Vec<u8>) {
        self.worker.manager.seed_baseline(class_name, bytecode);
    }

    /// Drive the pipeline until the watch channel closes or `cancel` fires.
    ///
    /// Cancellation stops intake; lane tasks already dispatched run to
    /// completion on the runtime's executor.
    pub async fn run(self, mut events: mpsc::Receiver<WatchEvent>, cancel: CancellationToken) {
        let mut lanes: HashMap<SmolStr, VecDeque<PendingChange>> = HashMap::new();
        let mut busy: HashSet<SmolStr> = HashSet::new();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<SmolStr>();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("runtime shutdown requested");
                    break;
                }
                Some(lane) = done_rx.recv() => {
                    busy.remove(&lane);
                    let next = lanes.get_mut(&lane).and_then(VecDeque::pop_front);
                    match next {
                        Some(work) => self.dispatch(lane, work, &mut busy, &done_tx),
                        None => {
                            lanes.remove(&lane);
                        }
                    }
                }
                maybe = events.recv() => {
                    let Some(event) = maybe else {
                        tracing::info!("watch channel closed; runtime stopping");
                        break;
                    };
                    match event {
                        WatchEvent::Changed { path, size_bytes, modified_at_ms, .. } => {
                            let lane = class_name_from_path(&path);
                            let work = PendingChange { path, size_bytes, modified_at_ms };
                            if busy.contains(&lane) {
                                // Per-class serialization: queue in arrival order
                                lanes.entry(lane).or_default().push_back(work);
                            } else {
                                self.dispatch(lane, work, &mut busy, &done_tx);
                            }
                        }
                        WatchEvent::Removed { path, .. } => {
                            tracing::debug!(path = %path.display(), "watched file removed");
                        }
                        WatchEvent::Overflow { watch_id, root, detail } => {
                            self.worker.log.append(
                                CorrelationId::new(),
                                None,
                                DomainEvent::WatchOverflow { id: watch_id, root, detail },
                            );
                        }
                    }
                }
            }
        }
    }

    fn dispatch(
        &self,
        lane: SmolStr,
        work: PendingChange,
        busy: &mut HashSet<SmolStr>,
        done_tx: &mpsc::UnboundedSender<SmolStr>,
    ) {
        busy.insert(lane.clone());
        let worker = Arc::clone(&self.worker);
        let budget = Arc::clone(&self.budget);
        let done = done_tx.clone();
        tokio::spawn(async move {
            // The semaphore is never closed; a failed acquire means shutdown
            let Ok(_permit) = budget.acquire_owned().await else {
                let _ = done.send(lane);
                return;
            };
            worker.handle_change(work).await;
            let _ = done.send(lane);
        });
    }
}

impl<I, C> Worker<I, C>
where
    I: Instrumentation,
    C: Clock,
{
    /// One full pipeline pass for one debounced change.
    async fn handle_change(&self, work: PendingChange) {
        let correlation = CorrelationId::new();
        let provisional = class_name_from_path(&work.path);
        let changed = self.log.append(
            correlation,
            None,
            DomainEvent::ClassFileChanged {
                path: work.path.clone(),
                class_name: provisional,
                size_bytes: work.size_bytes,
                modified_at_ms: work.modified_at_ms,
            },
        );

        if let Err(error) = self.pipeline(correlation, changed.id, &work).await {
            self.emit_failure(correlation, changed.id, &work, &error);
            let captured = self.snapshot.capture(error);
            if let Some(failures) = self.failures.lock().as_ref() {
                let _ = failures.send(captured);
            }
        }
    }

    /// Analyze → validate → redefine → reconcile. Validation-kind failures
    /// are terminal events, not errors; anything returned as `Err` is
    /// unexpected and gets snapshot treatment by the caller.
    async fn pipeline(
        &self,
        correlation: CorrelationId,
        changed_id: EventId,
        work: &PendingChange,
    ) -> Result<(), PipelineError> {
        let bytes = tokio::fs::read(&work.path)
            .await
            .map_err(|source| PipelineError::Io { path: work.path.clone(), source })?;

        let metadata = match bh_classfile::parse(&bytes) {
            Ok(metadata) => metadata,
            Err(error) => {
                // Unparseable bytes are a validation rejection, not a crash
                self.log.append(
                    correlation,
                    Some(changed_id),
                    DomainEvent::BytecodeRejected {
                        path: work.path.clone(),
                        class_name: class_name_from_path(&work.path),
                        classification: ChangeClassification::Unknown,
                        detail: format!("parse error: {error}"),
                    },
                );
                return Ok(());
            }
        };

        let extracted = self.log.append(
            correlation,
            Some(changed_id),
            DomainEvent::ClassMetadataExtracted {
                path: work.path.clone(),
                metadata: metadata.clone(),
            },
        );

        self.manager
            .process(correlation, Some(extracted.id), &work.path, &metadata, bytes)
            .await;
        Ok(())
    }

    /// Record an unexpected failure as a terminal event before capture.
    fn emit_failure(
        &self,
        correlation: CorrelationId,
        caused_by: EventId,
        work: &PendingChange,
        error: &PipelineError,
    ) {
        self.log.append(
            correlation,
            Some(caused_by),
            DomainEvent::ClassRedefinitionFailed {
                class_name: class_name_from_path(&work.path),
                path: work.path.clone(),
                reason: format!("{}: {error}", classify_error(error)),
                platform_error: None,
                recovery_hint: match error {
                    PipelineError::Io { .. } => {
                        Some("check the artifact is readable and fully written".to_string())
                    }
                    _ => None,
                },
            },
        );
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
