// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance reconciliation after a successful redefinition

use crate::tracker::InstanceTracker;
use bh_adapters::RedefineReport;
use bh_core::{Clock, InstanceFactory, UpdateMethod, UpdateOutcome};
use parking_lot::RwLock;
use smol_str::SmolStr;
use std::collections::HashMap;
use std::sync::Arc;

/// Which strategies the updater may select. The decision order itself is
/// fixed; disabling a strategy makes the decision fall through to the next
/// step.
#[derive(Debug, Clone)]
pub struct UpdatePolicy {
    pub enabled: Vec<UpdateMethod>,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self { enabled: UpdateMethod::ALL.to_vec() }
    }
}

impl UpdatePolicy {
    pub fn enabled(&self, method: UpdateMethod) -> bool {
        self.enabled.contains(&method)
    }
}

/// Applies an update strategy to tracked instances of a redefined class.
pub struct InstanceUpdater<C: Clock> {
    tracker: Arc<InstanceTracker>,
    factories: RwLock<HashMap<SmolStr, Arc<dyn InstanceFactory>>>,
    policy: UpdatePolicy,
    clock: C,
}

impl<C: Clock> InstanceUpdater<C> {
    pub fn new(tracker: Arc<InstanceTracker>, policy: UpdatePolicy, clock: C) -> Self {
        Self { tracker, factories: RwLock::new(HashMap::new()), policy, clock }
    }

    pub fn tracker(&self) -> &Arc<InstanceTracker> {
        &self.tracker
    }

    /// Declare a class as owned by a factory/registry collaborator.
    pub fn register_factory(&self, class_name: &str, factory: Arc<dyn InstanceFactory>) {
        self.factories.write().insert(SmolStr::new(class_name), factory);
    }

    /// Select and apply a strategy for `class_name`.
    ///
    /// Decision order: no live instances → NoUpdate; platform migrated
    /// everything → Automatic; all proxies → ProxyRefresh; factory-managed →
    /// FactoryReset; otherwise Reflection with per-instance isolation.
    /// Exactly one outcome per call; a single instance failure never aborts
    /// its siblings.
    pub fn apply(&self, class_name: &str, report: &RedefineReport) -> UpdateOutcome {
        let started = self.clock.now();

        // Iteration is bounded by the live set at the moment we begin;
        // instances reclaimed mid-update are simply absent from it.
        let live = self.tracker.instances_of(class_name);
        if live.is_empty() {
            return UpdateOutcome::no_update(class_name);
        }
        let total = live.len() as u32;

        if report.layout_preserved
            && report.methods_migrated
            && self.policy.enabled(UpdateMethod::Automatic)
        {
            return outcome(
                class_name,
                UpdateMethod::Automatic,
                total,
                total,
                0,
                self.clock.elapsed_ms(started),
                Some("platform migrated instances".to_string()),
            );
        }

        if live.iter().all(|i| i.is_proxy()) && self.policy.enabled(UpdateMethod::ProxyRefresh) {
            let mut updated = 0;
            let mut failed = 0;
            for instance in &live {
                match instance.refresh_proxy() {
                    Ok(()) => updated += 1,
                    Err(e) => {
                        failed += 1;
                        tracing::warn!(class = class_name, error = %e, "proxy refresh failed");
                    }
                }
            }
            return outcome(
                class_name,
                UpdateMethod::ProxyRefresh,
                updated,
                total,
                failed,
                self.clock.elapsed_ms(started),
                None,
            );
        }

        let factory = self.factories.read().get(class_name).cloned();
        if let Some(factory) = factory {
            if self.policy.enabled(UpdateMethod::FactoryReset) {
                let (updated, failed, detail) = match factory.reset(class_name) {
                    Ok(reset) => {
                        (total, 0, Some(format!("factory rebuilt {reset} instances")))
                    }
                    Err(e) => {
                        tracing::warn!(class = class_name, error = %e, "factory reset failed");
                        (0, total, Some(e.to_string()))
                    }
                };
                return outcome(
                    class_name,
                    UpdateMethod::FactoryReset,
                    updated,
                    total,
                    failed,
                    self.clock.elapsed_ms(started),
                    detail,
                );
            }
        }

        if self.policy.enabled(UpdateMethod::Reflection) {
            let mut updated = 0;
            let mut failed = 0;
            for instance in &live {
                match instance.reinitialize() {
                    Ok(()) => updated += 1,
                    Err(e) => {
                        // Isolated: siblings still get their update
                        failed += 1;
                        tracing::warn!(class = class_name, error = %e, "instance update failed");
                    }
                }
            }
            return outcome(
                class_name,
                UpdateMethod::Reflection,
                updated,
                total,
                failed,
                self.clock.elapsed_ms(started),
                None,
            );
        }

        outcome(
            class_name,
            UpdateMethod::NoUpdate,
            0,
            total,
            0,
            self.clock.elapsed_ms(started),
            Some("no enabled strategy applies".to_string()),
        )
    }
}

/// Build an outcome through the validating constructor. The counts above
/// hold the invariants by construction; a violation is a bug worth a loud
/// log line, not a crash mid-pipeline.
fn outcome(
    class_name: &str,
    method: UpdateMethod,
    updated: u32,
    total: u32,
    failed: u32,
    duration_ms: u64,
    detail: Option<String>,
) -> UpdateOutcome {
    UpdateOutcome::new(class_name, method, updated, total, failed, duration_ms, detail)
        .unwrap_or_else(|violation| {
            tracing::error!(class = class_name, error = %violation, "update outcome discarded");
            UpdateOutcome::no_update(class_name)
        })
}

#[cfg(test)]
#[path = "updater_tests.rs"]
mod tests;
