// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Weak-reference registry of live instances, keyed by class name

use bh_core::HotInstance;
use parking_lot::{Mutex, RwLock};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

#[derive(Default)]
struct ClassEntry {
    refs: Vec<Weak<dyn HotInstance>>,
}

/// Per-class registry of weak references to live instances.
///
/// The registry never extends an instance's lifetime; a reclaimed referent
/// is purged at the next sweep. The outer map takes a read lock on the hot
/// paths; mutation is serialized per class, so concurrent `track` and
/// `sweep` are linearizable per class.
pub struct InstanceTracker {
    classes: RwLock<HashMap<SmolStr, Arc<Mutex<ClassEntry>>>>,
}

impl Default for InstanceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceTracker {
    pub fn new() -> Self {
        Self { classes: RwLock::new(HashMap::new()) }
    }

    /// Begin tracking a class (idempotent). `track` enables implicitly;
    /// `enable` exists so a class can be registered before any instance is.
    pub fn enable(&self, class_name: &str) {
        self.entry(class_name);
    }

    pub fn is_enabled(&self, class_name: &str) -> bool {
        self.classes.read().contains_key(class_name)
    }

    /// Register a live instance under its class.
    pub fn track(&self, instance: &Arc<dyn HotInstance>) {
        let entry = self.entry(instance.class_name());
        entry.lock().refs.push(Arc::downgrade(instance));
    }

    /// Number of live referents for a class.
    pub fn count(&self, class_name: &str) -> usize {
        let Some(entry) = self.classes.read().get(class_name).cloned() else {
            return 0;
        };
        let entry = entry.lock();
        entry.refs.iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Upgrade and return the live instances of a class, in tracking order.
    ///
    /// Referents reclaimed between the upgrade and use are the caller's
    /// concern; the returned `Arc`s keep these particular instances alive.
    pub fn instances_of(&self, class_name: &str) -> Vec<Arc<dyn HotInstance>> {
        let Some(entry) = self.classes.read().get(class_name).cloned() else {
            return Vec::new();
        };
        let entry = entry.lock();
        entry.refs.iter().filter_map(Weak::upgrade).collect()
    }

    /// Purge reclaimed referents from every class. Returns how many slots
    /// were removed. Takes exclusive access one class at a time.
    pub fn sweep(&self) -> usize {
        let entries: Vec<Arc<Mutex<ClassEntry>>> =
            self.classes.read().values().cloned().collect();
        let mut removed = 0;
        for entry in entries {
            let mut entry = entry.lock();
            let before = entry.refs.len();
            entry.refs.retain(|w| w.strong_count() > 0);
            removed += before - entry.refs.len();
        }
        removed
    }

    /// Classes with at least one registration (live or not yet swept).
    pub fn tracked_classes(&self) -> Vec<SmolStr> {
        self.classes.read().keys().cloned().collect()
    }

    fn entry(&self, class_name: &str) -> Arc<Mutex<ClassEntry>> {
        if let Some(entry) = self.classes.read().get(class_name) {
            return Arc::clone(entry);
        }
        let mut classes = self.classes.write();
        Arc::clone(classes.entry(SmolStr::new(class_name)).or_default())
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
