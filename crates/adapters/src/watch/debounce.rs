// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-path coalescing of modify bursts
//!
//! Pure state machine: `observe` records an observation and (re)arms the
//! path's deadline; `due` drains entries whose window has elapsed. Time is
//! passed in so tests drive it directly.

use bh_core::WatchId;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// One coalesced change, carrying the final observed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebouncedChange {
    pub watch_id: WatchId,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at_ms: u64,
}

#[derive(Debug)]
struct Pending {
    watch_id: WatchId,
    size_bytes: u64,
    modified_at_ms: u64,
    deadline: Instant,
}

/// Coalesces rapid observations of the same path into one change.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: HashMap<PathBuf, Pending>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: HashMap::new() }
    }

    /// Record an observation; later observations of the same path replace
    /// earlier state and push the deadline out.
    pub fn observe(
        &mut self,
        watch_id: WatchId,
        path: PathBuf,
        size_bytes: u64,
        modified_at_ms: u64,
        now: Instant,
    ) {
        self.pending.insert(
            path,
            Pending { watch_id, size_bytes, modified_at_ms, deadline: now + self.window },
        );
    }

    /// Drop any pending observation for `path` (the file was removed).
    pub fn cancel(&mut self, path: &std::path::Path) {
        self.pending.remove(path);
    }

    /// Drain entries whose window has elapsed, oldest deadline first.
    pub fn due(&mut self, now: Instant) -> Vec<DebouncedChange> {
        let mut ready: Vec<(PathBuf, Instant)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(path, p)| (path.clone(), p.deadline))
            .collect();
        ready.sort_by_key(|(_, deadline)| *deadline);

        ready
            .into_iter()
            .filter_map(|(path, _)| {
                self.pending.remove(&path).map(|p| DebouncedChange {
                    watch_id: p.watch_id,
                    path,
                    size_bytes: p.size_bytes,
                    modified_at_ms: p.modified_at_ms,
                })
            })
            .collect()
    }

    /// Earliest pending deadline, for sleep scheduling.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
