// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch registrations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::id::WatchId;

/// One registered directory watch: a root, a recursion flag, and the
/// filename globs that select class artifacts beneath it.
///
/// Pattern syntax is validated by the watch adapter at registration time;
/// the registration itself is plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRegistration {
    pub id: WatchId,
    pub root: PathBuf,
    pub patterns: Vec<String>,
    pub recursive: bool,
}

impl WatchRegistration {
    pub fn new(root: impl Into<PathBuf>, patterns: Vec<String>, recursive: bool) -> Self {
        Self { id: WatchId::new(), root: root.into(), patterns, recursive }
    }
}
