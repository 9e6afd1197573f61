// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon wiring and main loop

use bh_adapters::{FsWatcher, Instrumentation, UnsupportedInstrumentation, WatchError};
use bh_core::{Config, CorrelationId, DomainEvent, SystemClock};
use bh_engine::{InstanceTracker, Runtime, RuntimeConfig, RuntimeDeps};
use bh_storage::{EventLog, Journal, JournalError, JournalSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors that abort daemon startup.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config: {0}")]
    Config(#[from] bh_core::ConfigError),
    #[error("journal: {0}")]
    Journal(#[from] JournalError),
    #[error("watch: {0}")]
    Watch(#[from] WatchError),
    #[error("state dir {path}: {source}")]
    StateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run the daemon with the honest null instrumentation port.
pub async fn run(
    config: Config,
    state_dir: PathBuf,
    cancel: CancellationToken,
) -> Result<(), DaemonError> {
    run_with(UnsupportedInstrumentation, config, state_dir, cancel).await
}

/// Run the daemon wiring against a caller-supplied platform port.
///
/// Replays the journal into the event log, registers the configured watch
/// roots, and drives the pipeline until `cancel` fires or every watch
/// channel closes.
pub async fn run_with<I>(
    instrumentation: I,
    config: Config,
    state_dir: PathBuf,
    cancel: CancellationToken,
) -> Result<(), DaemonError>
where
    I: Instrumentation + 'static,
{
    std::fs::create_dir_all(&state_dir)
        .map_err(|source| DaemonError::StateDir { path: state_dir.clone(), source })?;

    // History from previous runs; losing it only loses history
    let journal_path = state_dir.join("events.journal");
    let history = Journal::replay(&journal_path)?;
    if !history.is_empty() {
        tracing::info!(records = history.len(), "journal replayed");
    }
    let log = Arc::new(EventLog::with_history(SystemClock, history));
    log.subscribe(Arc::new(JournalSink::new(Journal::open(&journal_path)?)));

    let tracker = Arc::new(InstanceTracker::new());
    let runtime = Runtime::new(
        RuntimeDeps {
            instrumentation,
            log: Arc::clone(&log),
            tracker,
            clock: SystemClock,
        },
        RuntimeConfig::from_config(&config),
    );

    let (watch_tx, watch_rx) = mpsc::channel(256);
    let watcher = FsWatcher::new(watch_tx, config.debounce());
    for root in &config.watch.roots {
        let id = watcher.start_watching(root, &config.watch.patterns, config.watch.recursive)?;
        log.append(
            CorrelationId::new(),
            None,
            DomainEvent::WatchStarted {
                id,
                root: root.clone(),
                patterns: config.watch.patterns.clone(),
                recursive: config.watch.recursive,
            },
        );
    }
    tracing::info!(
        roots = config.watch.roots.len(),
        patterns = ?config.watch.patterns,
        debounce_ms = config.watch.debounce_ms,
        "bhd started"
    );

    runtime.run(watch_rx, cancel).await;

    for registration in watcher.registrations() {
        watcher.stop_watching(registration.id);
        log.append(
            CorrelationId::new(),
            None,
            DomainEvent::WatchStopped { id: registration.id },
        );
    }
    tracing::info!("bhd stopped");
    Ok(())
}

/// Resolve the effective configuration: an explicit path, else
/// `bytehot.toml` in the working directory, else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, DaemonError> {
    if let Some(path) = explicit {
        return Ok(Config::load(path)?);
    }
    let local = Path::new("bytehot.toml");
    if local.exists() {
        return Ok(Config::load(local)?);
    }
    Ok(Config::default())
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
