// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bh-adapters: Ports to the platform and the filesystem
//!
//! The instrumentation port wraps the platform's class-redefinition
//! primitive; the watch adapter turns OS file events into debounced,
//! pattern-filtered change notifications for the pipeline.

pub mod instrumentation;
pub mod watch;

pub use instrumentation::{
    Instrumentation, LoadedClass, RedefineReport, RedefinitionError, UnsupportedInstrumentation,
};
#[cfg(any(test, feature = "test-support"))]
pub use instrumentation::{FakeInstrumentation, InstrumentationCall};
pub use watch::{Debouncer, FsWatcher, WatchError, WatchEvent};
