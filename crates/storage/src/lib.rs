// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bh-storage: Append-only event log and on-disk journal
//!
//! The [`log::EventLog`] is the authoritative in-process record; the
//! [`journal::Journal`] optionally persists it as length-prefixed records
//! (4-byte big-endian length + self-describing JSON payload). Losing the
//! journal loses history across restarts, nothing else.

pub mod journal;
pub mod log;

pub use journal::{Journal, JournalError, JournalSink};
pub use log::{EventLog, EventSink};
