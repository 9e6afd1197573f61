// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hot-swap orchestration
//!
//! Sole emitter of terminal pipeline outcomes. One `process` call drives a
//! single request through the state machine:
//!
//! ```text
//!  Requested ──validate──▶ Validated ──redefine──▶ Redefined ──reconcile──▶ Completed
//!      │                        │                      │
//!      └─▶ Rejected              └─▶ Failed             └─▶ PartiallyCompleted
//! ```

use crate::updater::InstanceUpdater;
use bh_adapters::{Instrumentation, LoadedClass, RedefinitionError};
use bh_classfile::{validate, ValidationPolicy};
use bh_core::{Clock, CorrelationId, DomainEvent, EventId, HotSwapRequest};
use bh_storage::EventLog;
use parking_lot::Mutex;
use smol_str::SmolStr;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Terminal state of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Validation refused the change.
    Rejected,
    /// Lookup or redefinition failed; the runtime keeps its pre-call state.
    Failed,
    /// Redefined and every instance reconciled.
    Completed,
    /// Redefined, but some instance updates failed.
    PartiallyCompleted,
}

/// Orchestrates validate → redefine → reconcile for one class at a time.
///
/// The caller serializes requests per class; the manager never retries a
/// failed redefinition on its own.
pub struct HotSwapManager<I, C: Clock> {
    instrumentation: I,
    log: Arc<EventLog<C>>,
    updater: Arc<InstanceUpdater<C>>,
    clock: C,
    validation: ValidationPolicy,
    redefine_timeout: Duration,
    /// Last definition this manager knows per class: seeded from the
    /// platform's handle, refreshed after every successful swap. Lets
    /// validation proceed when the platform no longer reports the class.
    baseline: Mutex<HashMap<SmolStr, Vec<u8>>>,
}

impl<I, C> HotSwapManager<I, C>
where
    I: Instrumentation,
    C: Clock,
{
    pub fn new(
        instrumentation: I,
        log: Arc<EventLog<C>>,
        updater: Arc<InstanceUpdater<C>>,
        clock: C,
        validation: ValidationPolicy,
        redefine_timeout: Duration,
    ) -> Self {
        Self {
            instrumentation,
            log,
            updater,
            clock,
            validation,
            redefine_timeout,
            baseline: Mutex::new(HashMap::new()),
        }
    }

    /// Record a known-good definition for a class (e.g. at startup, from a
    /// directory snapshot) so the first observed change can be diffed.
    pub fn seed_baseline(&self, class_name: &str, bytecode: Vec<u8>) {
        self.baseline.lock().insert(SmolStr::new(class_name), bytecode);
    }

    /// Drive one proposed change through the pipeline.
    ///
    /// `caused_by` is the event that triggered this request (normally the
    /// `ClassMetadataExtracted` for these bytes). Every emitted event joins
    /// `correlation`.
    pub async fn process(
        &self,
        correlation: CorrelationId,
        caused_by: Option<EventId>,
        path: &Path,
        new_meta: &bh_core::ClassMetadata,
        new_bytes: Vec<u8>,
    ) -> SwapOutcome {
        let class_name = new_meta.class_name.clone();

        // The loaded definition (or the last one this manager applied) seeds
        // the validator's "original" side. The lookup happens up front, but
        // an absent class only surfaces after validation so the observable
        // event order follows the state machine.
        let handle = self.instrumentation.find_loaded_class(&class_name).await;
        let original_bytes: Option<Vec<u8>> = handle
            .as_ref()
            .map(|h| h.bytecode.clone())
            .or_else(|| self.baseline.lock().get(class_name.as_str()).cloned());
        let original_meta =
            original_bytes.as_deref().and_then(|bytes| bh_classfile::parse(bytes).ok());

        let verdict = validate(self.validation, original_meta.as_ref(), new_meta);
        if !verdict.safe {
            tracing::info!(class = %class_name, detail = %verdict.detail, "bytecode rejected");
            self.log.append(
                correlation,
                caused_by,
                DomainEvent::BytecodeRejected {
                    path: path.to_path_buf(),
                    class_name,
                    classification: verdict.classification,
                    detail: verdict.detail,
                },
            );
            return SwapOutcome::Rejected;
        }

        let validated = self.log.append(
            correlation,
            caused_by,
            DomainEvent::BytecodeValidated {
                path: path.to_path_buf(),
                class_name: class_name.clone(),
                safe: true,
                detail: verdict.detail.clone(),
            },
        );

        let request = HotSwapRequest::new(
            class_name.clone(),
            path,
            original_bytes.unwrap_or_default(),
            new_bytes,
            verdict.detail,
            validated.id,
            "class file changed on disk",
        );
        let requested = self.log.append(
            correlation,
            Some(validated.id),
            DomainEvent::HotSwapRequested {
                request_id: request.id,
                path: request.path.clone(),
                class_name: class_name.clone(),
                original_sha256: request.original_sha256(),
                new_sha256: request.new_sha256(),
                original: request.original.clone(),
                new_bytes: request.new_bytes.clone(),
                reason: request.reason.clone(),
            },
        );

        if !self.instrumentation.is_redefinition_supported() {
            self.fail(
                correlation,
                requested.id,
                path,
                &class_name,
                "UnsupportedChange",
                Some("platform has no redefinition primitive".to_string()),
                Some("run under a platform that supports class redefinition".to_string()),
            );
            return SwapOutcome::Failed;
        }

        let Some(handle) = handle else {
            self.fail(
                correlation,
                requested.id,
                path,
                &class_name,
                "ClassNotFound",
                None,
                Some("load the class before hot-swapping it".to_string()),
            );
            return SwapOutcome::Failed;
        };

        // The request is consumed here, exactly once.
        let (redefined, duration_ms, applied) = match self.redefine(&handle, request).await {
            Ok(outcome) => outcome,
            Err(error) => {
                self.fail(
                    correlation,
                    requested.id,
                    path,
                    &class_name,
                    error.reason(),
                    Some(error.to_string()),
                    recovery_hint(&error),
                );
                return SwapOutcome::Failed;
            }
        };

        self.baseline.lock().insert(class_name.clone(), applied);

        let affected = self.updater.tracker().count(&class_name) as u32;
        let succeeded = self.log.append(
            correlation,
            Some(requested.id),
            DomainEvent::ClassRedefinitionSucceeded {
                class_name: class_name.clone(),
                path: path.to_path_buf(),
                affected_instances: affected,
                detail: redefined
                    .detail
                    .clone()
                    .unwrap_or_else(|| "method bodies replaced".to_string()),
                duration_ms,
            },
        );
        tracing::info!(class = %class_name, affected, elapsed_ms = duration_ms, "redefinition applied");

        let outcome = self.updater.apply(&class_name, &redefined);
        let complete = outcome.complete();
        self.log.append(
            correlation,
            Some(succeeded.id),
            DomainEvent::InstancesUpdated { outcome },
        );

        if complete {
            SwapOutcome::Completed
        } else {
            SwapOutcome::PartiallyCompleted
        }
    }

    /// Submit to the platform under the configured deadline. Consumes the
    /// request; on success the applied bytes come back for the baseline.
    async fn redefine(
        &self,
        handle: &LoadedClass,
        request: HotSwapRequest,
    ) -> Result<(bh_adapters::RedefineReport, u64, Vec<u8>), RedefinitionError> {
        let started = self.clock.now();
        let call = self.instrumentation.redefine(handle, &request.new_bytes);
        let report = match tokio::time::timeout(self.redefine_timeout, call).await {
            Ok(result) => result?,
            Err(_) => return Err(RedefinitionError::Platform("timeout".to_string())),
        };
        Ok((report, self.clock.elapsed_ms(started), request.new_bytes))
    }

    #[allow(clippy::too_many_arguments)]
    fn fail(
        &self,
        correlation: CorrelationId,
        caused_by: EventId,
        path: &Path,
        class_name: &str,
        reason: &str,
        platform_error: Option<String>,
        recovery_hint: Option<String>,
    ) {
        tracing::warn!(class = class_name, reason, "redefinition failed");
        self.log.append(
            correlation,
            Some(caused_by),
            DomainEvent::ClassRedefinitionFailed {
                class_name: class_name.into(),
                path: path.to_path_buf(),
                reason: reason.to_string(),
                platform_error,
                recovery_hint,
            },
        );
    }
}

fn recovery_hint(error: &RedefinitionError) -> Option<String> {
    match error {
        RedefinitionError::UnsupportedChange(_) => {
            Some("only method-body changes are hot-swappable".to_string())
        }
        RedefinitionError::VerificationFailed(_) => {
            Some("recompile and check the bytecode version the platform expects".to_string())
        }
        RedefinitionError::ClassNotFound(_) => {
            Some("load the class before hot-swapping it".to_string())
        }
        RedefinitionError::Platform(detail) if detail == "timeout" => {
            Some("raise redefine.timeout_ms or investigate platform stalls".to_string())
        }
        RedefinitionError::Platform(_) => None,
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
