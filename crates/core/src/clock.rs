// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! The pipeline needs two readings: wall-clock milliseconds for event
//! timestamps and a monotonic instant for measuring redefinition and
//! update durations. Components take a `Clock` so tests drive both.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, UNIX_EPOCH};

pub trait Clock: Clone + Send + Sync {
    /// Monotonic reading for measuring durations.
    fn now(&self) -> Instant;

    /// Wall-clock milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> u64;

    /// Milliseconds elapsed since `start`, for event duration fields.
    fn elapsed_ms(&self, start: Instant) -> u64 {
        self.now().duration_since(start).as_millis() as u64
    }
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        UNIX_EPOCH.elapsed().unwrap_or_default().as_millis() as u64
    }
}

/// Fake clock for testing: time moves only when a test advances it.
#[derive(Clone)]
pub struct FakeClock {
    state: Arc<Mutex<FakeNow>>,
}

struct FakeNow {
    instant: Instant,
    epoch_ms: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeNow {
                instant: Instant::now(),
                epoch_ms: 1_000_000,
            })),
        }
    }

    /// Move both readings forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.instant += duration;
        state.epoch_ms += duration.as_millis() as u64;
    }

    /// Pin the wall-clock reading, leaving the monotonic one alone.
    pub fn set_epoch_ms(&self, ms: u64) {
        self.state.lock().epoch_ms = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.state.lock().instant
    }

    fn epoch_ms(&self) -> u64 {
        self.state.lock().epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
