// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline error taxonomy

use bh_adapters::RedefinitionError;
use smol_str::SmolStr;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by pipeline stages.
///
/// Validation and redefinition failures are normally recorded as terminal
/// events, not raised; these variants exist for the paths that do raise,
/// and for the snapshot engine, which classifies whatever reaches it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("hot-swap failed for {class_name}: {source}")]
    Redefinition {
        class_name: SmolStr,
        #[source]
        source: RedefinitionError,
    },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("null reference: {0}")]
    NullReference(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("{0}")]
    Other(String),
}
