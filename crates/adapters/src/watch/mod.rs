// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem watch adapter
//!
//! Wraps the OS file-event stream (via `notify`) in pattern filtering,
//! per-path debouncing, and overflow recovery, and delivers [`WatchEvent`]s
//! into the pipeline's channel.

mod debounce;

pub use debounce::{DebouncedChange, Debouncer};

use bh_core::{WatchId, WatchRegistration};
use glob::Pattern;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from watch registration.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("invalid path: {0} is not an existing directory")]
    InvalidPath(PathBuf),
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("watch backend: {0}")]
    Backend(#[from] notify::Error),
}

/// Notifications delivered to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Debounced change carrying the final observed file state.
    Changed { watch_id: WatchId, path: PathBuf, size_bytes: u64, modified_at_ms: u64 },
    /// A matching file disappeared.
    Removed { watch_id: WatchId, path: PathBuf },
    /// The OS event queue overflowed; the subtree was re-registered.
    Overflow { watch_id: WatchId, root: PathBuf, detail: String },
}

/// Raw signal from the notify callback thread to the dispatch task.
enum RawEvent {
    Touched(PathBuf),
    Removed(PathBuf),
    Rescan(String),
}

struct Registration {
    watcher: RecommendedWatcher,
    registration: WatchRegistration,
}

/// Directory watcher with pattern filtering and debouncing.
///
/// Each registration owns an OS watcher and a dispatch task; stopping a
/// registration drops both. Must be constructed inside a tokio runtime.
pub struct FsWatcher {
    tx: mpsc::Sender<WatchEvent>,
    window: Duration,
    inner: Arc<Mutex<HashMap<WatchId, Registration>>>,
}

impl FsWatcher {
    /// `window` is the per-path debounce duration.
    pub fn new(tx: mpsc::Sender<WatchEvent>, window: Duration) -> Self {
        Self { tx, window, inner: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Register a directory watch. `root` must be an existing directory.
    pub fn start_watching(
        &self,
        root: &Path,
        patterns: &[String],
        recursive: bool,
    ) -> Result<WatchId, WatchError> {
        if !root.is_dir() {
            return Err(WatchError::InvalidPath(root.to_path_buf()));
        }
        let compiled: Vec<Pattern> = patterns
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|source| WatchError::InvalidPattern { pattern: p.clone(), source })
            })
            .collect::<Result<_, _>>()?;

        let registration = WatchRegistration::new(root, patterns.to_vec(), recursive);
        let id = registration.id;

        let (raw_tx, raw_rx) = mpsc::channel::<RawEvent>(256);
        let mut watcher = notify::recommended_watcher(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if event.need_rescan() {
                        let _ = raw_tx.blocking_send(RawEvent::Rescan(
                            "watch queue overflowed".to_string(),
                        ));
                        return;
                    }
                    let removed = matches!(event.kind, EventKind::Remove(_));
                    let relevant = removed
                        || matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
                    if !relevant {
                        return;
                    }
                    for path in event.paths {
                        if !basename_matches(&compiled, &path) {
                            continue;
                        }
                        let raw = if removed {
                            RawEvent::Removed(path)
                        } else {
                            RawEvent::Touched(path)
                        };
                        let _ = raw_tx.blocking_send(raw);
                    }
                }
                Err(e) => {
                    let _ = raw_tx.blocking_send(RawEvent::Rescan(e.to_string()));
                }
            },
        )?;
        watcher.watch(root, recursive_mode(recursive))?;

        tracing::info!(
            %id,
            root = %root.display(),
            ?patterns,
            recursive,
            "watch started"
        );
        self.inner
            .lock()
            .insert(id, Registration { watcher, registration: registration.clone() });

        tokio::spawn(dispatch_loop(
            registration,
            raw_rx,
            self.tx.clone(),
            self.window,
            Arc::clone(&self.inner),
        ));
        Ok(id)
    }

    /// Stop a registration. Idempotent: an unknown id is a no-op.
    ///
    /// Cancels subsequent emissions only; work already dispatched into the
    /// pipeline completes.
    pub fn stop_watching(&self, id: WatchId) -> bool {
        let removed = self.inner.lock().remove(&id).is_some();
        if removed {
            tracing::info!(%id, "watch stopped");
        }
        removed
    }

    /// Currently active registrations.
    pub fn registrations(&self) -> Vec<WatchRegistration> {
        self.inner.lock().values().map(|r| r.registration.clone()).collect()
    }
}

fn recursive_mode(recursive: bool) -> RecursiveMode {
    if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    }
}

fn basename_matches(patterns: &[Pattern], path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    patterns.iter().any(|p| p.matches(&name))
}

/// Per-registration task: stats touched files, debounces, emits.
async fn dispatch_loop(
    registration: WatchRegistration,
    mut raw_rx: mpsc::Receiver<RawEvent>,
    tx: mpsc::Sender<WatchEvent>,
    window: Duration,
    inner: Arc<Mutex<HashMap<WatchId, Registration>>>,
) {
    let watch_id = registration.id;
    let mut debouncer = Debouncer::new(window);

    loop {
        let deadline = debouncer.next_deadline().map(tokio::time::Instant::from_std);
        tokio::select! {
            maybe = raw_rx.recv() => {
                match maybe {
                    // All callback senders dropped: registration stopped
                    None => break,
                    Some(RawEvent::Touched(path)) => {
                        match tokio::fs::metadata(&path).await {
                            Ok(meta) => {
                                let modified_at_ms = meta
                                    .modified()
                                    .ok()
                                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                                    .map(|d| d.as_millis() as u64)
                                    .unwrap_or(0);
                                debouncer.observe(
                                    watch_id,
                                    path,
                                    meta.len(),
                                    modified_at_ms,
                                    Instant::now(),
                                );
                            }
                            // Raced with deletion; the Remove event follows
                            Err(_) => debouncer.cancel(&path),
                        }
                    }
                    Some(RawEvent::Removed(path)) => {
                        debouncer.cancel(&path);
                        if tx.send(WatchEvent::Removed { watch_id, path }).await.is_err() {
                            break;
                        }
                    }
                    Some(RawEvent::Rescan(detail)) => {
                        tracing::warn!(%watch_id, detail, "watch overflow; re-registering");
                        re_register(&inner, &registration);
                        let overflow = WatchEvent::Overflow {
                            watch_id,
                            root: registration.root.clone(),
                            detail,
                        };
                        if tx.send(overflow).await.is_err() {
                            break;
                        }
                    }
                }
            }
            _ = sleep_until_opt(deadline), if deadline.is_some() => {
                for change in debouncer.due(Instant::now()) {
                    let event = WatchEvent::Changed {
                        watch_id: change.watch_id,
                        path: change.path,
                        size_bytes: change.size_bytes,
                        modified_at_ms: change.modified_at_ms,
                    };
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

async fn sleep_until_opt(deadline: Option<tokio::time::Instant>) {
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(deadline).await;
    }
}

/// Drain-and-rearm after an OS queue overflow: drop the old OS registration
/// for the subtree and register it again.
fn re_register(inner: &Arc<Mutex<HashMap<WatchId, Registration>>>, registration: &WatchRegistration) {
    let mut guard = inner.lock();
    let Some(entry) = guard.get_mut(&registration.id) else {
        return; // stopped concurrently
    };
    let _ = entry.watcher.unwatch(&registration.root);
    if let Err(e) = entry.watcher.watch(&registration.root, recursive_mode(registration.recursive)) {
        tracing::error!(
            id = %registration.id,
            root = %registration.root.display(),
            error = %e,
            "re-register after overflow failed"
        );
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
