// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration
//!
//! Loaded from `bytehot.toml`; every section and field has a default so an
//! absent file is a valid (if idle) configuration.

use crate::update::UpdateMethod;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level agent configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub watch: WatchConfig,
    pub snapshot: SnapshotConfig,
    pub redefine: RedefineConfig,
    pub update: UpdateConfig,
}

/// `[watch]` — directories to monitor and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Absolute directories to monitor.
    pub roots: Vec<PathBuf>,
    /// Filename globs selecting class artifacts.
    pub patterns: Vec<String>,
    pub recursive: bool,
    /// Per-path coalescing window for modify bursts.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            patterns: vec!["*.class".to_string()],
            recursive: true,
            debounce_ms: 100,
        }
    }
}

/// `[snapshot]` — failure-capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Number of trailing events captured with a failure.
    pub window: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

/// `[redefine]` — platform-call settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedefineConfig {
    /// Deadline for one platform redefinition call.
    pub timeout_ms: u64,
}

impl Default for RedefineConfig {
    fn default() -> Self {
        Self { timeout_ms: 5_000 }
    }
}

/// `[update]` — instance-reconciliation policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateConfig {
    /// Strategies the updater may select, in no particular order; the
    /// decision procedure's order is fixed.
    pub enabled_strategies: Vec<UpdateMethod>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self { enabled_strategies: UpdateMethod::ALL.to_vec() }
    }
}

impl Config {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.watch.debounce_ms)
    }

    pub fn redefine_timeout(&self) -> Duration {
        Duration::from_millis(self.redefine.timeout_ms)
    }

    pub fn strategy_enabled(&self, method: UpdateMethod) -> bool {
        self.update.enabled_strategies.contains(&method)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
