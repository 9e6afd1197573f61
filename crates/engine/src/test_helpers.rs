// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for engine tests

use bh_core::{HotInstance, UpdateError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Instance double with scripted behavior and call counters.
pub struct TestInstance {
    class: String,
    proxy: bool,
    fail_reinitialize: bool,
    pub reinitialized: AtomicUsize,
    pub proxy_refreshed: AtomicUsize,
}

impl TestInstance {
    pub fn new(class: &str) -> Arc<Self> {
        Arc::new(Self {
            class: class.to_string(),
            proxy: false,
            fail_reinitialize: false,
            reinitialized: AtomicUsize::new(0),
            proxy_refreshed: AtomicUsize::new(0),
        })
    }

    pub fn proxy(class: &str) -> Arc<Self> {
        Arc::new(Self {
            class: class.to_string(),
            proxy: true,
            fail_reinitialize: false,
            reinitialized: AtomicUsize::new(0),
            proxy_refreshed: AtomicUsize::new(0),
        })
    }

    pub fn failing(class: &str) -> Arc<Self> {
        Arc::new(Self {
            class: class.to_string(),
            proxy: false,
            fail_reinitialize: true,
            reinitialized: AtomicUsize::new(0),
            proxy_refreshed: AtomicUsize::new(0),
        })
    }
}

impl HotInstance for TestInstance {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn reinitialize(&self) -> Result<(), UpdateError> {
        if self.fail_reinitialize {
            return Err(UpdateError::Reinitialize("scripted failure".to_string()));
        }
        self.reinitialized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_proxy(&self) -> bool {
        self.proxy
    }

    fn refresh_proxy(&self) -> Result<(), UpdateError> {
        if !self.proxy {
            return Err(UpdateError::Unsupported("proxy refresh"));
        }
        self.proxy_refreshed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Upcast helper: the tracker API takes `Arc<dyn HotInstance>`.
pub fn as_instance(instance: &Arc<TestInstance>) -> Arc<dyn HotInstance> {
    Arc::clone(instance) as Arc<dyn HotInstance>
}
