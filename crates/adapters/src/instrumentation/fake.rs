// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake instrumentation for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Instrumentation, LoadedClass, RedefineReport, RedefinitionError};
use async_trait::async_trait;
use parking_lot::Mutex;
use smol_str::SmolStr;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Recorded call to FakeInstrumentation
#[derive(Debug, Clone)]
pub enum InstrumentationCall {
    Find { name: String },
    Redefine { name: String, byte_len: usize },
}

/// Fake platform instrumentation for testing
///
/// Allows programmatic control over the loaded-class set and redefinition
/// behavior, and records all calls.
#[derive(Clone)]
pub struct FakeInstrumentation {
    inner: Arc<Mutex<FakeState>>,
}

struct FakeState {
    classes: HashMap<SmolStr, Vec<u8>>,
    calls: Vec<InstrumentationCall>,
    fail_next_redefine: Option<RedefinitionError>,
    redefine_delay: Option<Duration>,
    layout_preserved: bool,
    methods_migrated: bool,
    supported: bool,
}

impl Default for FakeInstrumentation {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeInstrumentation {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                classes: HashMap::new(),
                calls: Vec::new(),
                fail_next_redefine: None,
                redefine_delay: None,
                layout_preserved: false,
                methods_migrated: false,
                supported: true,
            })),
        }
    }

    /// Mark a class as loaded with the given definition bytes.
    pub fn load_class(&self, name: &str, bytecode: Vec<u8>) {
        self.inner.lock().classes.insert(SmolStr::new(name), bytecode);
    }

    /// Drop a class from the loaded set.
    pub fn unload_class(&self, name: &str) {
        self.inner.lock().classes.remove(name);
    }

    /// Bytecode the fake platform currently holds for a class.
    pub fn loaded_bytecode(&self, name: &str) -> Option<Vec<u8>> {
        self.inner.lock().classes.get(name).cloned()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<InstrumentationCall> {
        self.inner.lock().calls.clone()
    }

    /// Set error to return on next redefine
    pub fn set_fail_next_redefine(&self, error: RedefinitionError) {
        self.inner.lock().fail_next_redefine = Some(error);
    }

    /// Delay every redefine call (for deadline tests)
    pub fn set_redefine_delay(&self, delay: Duration) {
        self.inner.lock().redefine_delay = Some(delay);
    }

    /// Control the success report's migration flags
    pub fn set_report(&self, layout_preserved: bool, methods_migrated: bool) {
        let mut inner = self.inner.lock();
        inner.layout_preserved = layout_preserved;
        inner.methods_migrated = methods_migrated;
    }

    pub fn set_supported(&self, supported: bool) {
        self.inner.lock().supported = supported;
    }

    pub fn redefine_count(&self) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, InstrumentationCall::Redefine { .. }))
            .count()
    }
}

#[async_trait]
impl Instrumentation for FakeInstrumentation {
    async fn find_loaded_class(&self, name: &str) -> Option<LoadedClass> {
        let mut inner = self.inner.lock();
        inner.calls.push(InstrumentationCall::Find { name: name.to_string() });
        inner
            .classes
            .get(name)
            .map(|bytecode| LoadedClass { name: SmolStr::new(name), bytecode: bytecode.clone() })
    }

    async fn redefine(
        &self,
        class: &LoadedClass,
        new_bytes: &[u8],
    ) -> Result<RedefineReport, RedefinitionError> {
        let delay = {
            let mut inner = self.inner.lock();
            inner.calls.push(InstrumentationCall::Redefine {
                name: class.name.to_string(),
                byte_len: new_bytes.len(),
            });
            inner.redefine_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock();
        if let Some(error) = inner.fail_next_redefine.take() {
            return Err(error);
        }
        if !inner.classes.contains_key(class.name.as_str()) {
            return Err(RedefinitionError::ClassNotFound(class.name.to_string()));
        }
        inner.classes.insert(class.name.clone(), new_bytes.to_vec());
        Ok(RedefineReport {
            layout_preserved: inner.layout_preserved,
            methods_migrated: inner.methods_migrated,
            detail: None,
        })
    }

    fn is_redefinition_supported(&self) -> bool {
        self.inner.lock().supported
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
