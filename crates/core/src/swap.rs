// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hot-swap requests

use crate::artifact::sha256_hex;
use crate::event::EventId;
use smol_str::SmolStr;
use std::path::PathBuf;

pub use crate::id::SwapRequestId;

/// A validated redefinition, ready for submission to the platform.
///
/// Deliberately not `Clone`: a request is consumed exactly once by the
/// redefinition step.
#[derive(Debug)]
pub struct HotSwapRequest {
    pub id: SwapRequestId,
    pub class_name: SmolStr,
    pub path: PathBuf,
    /// Bytecode the platform currently holds for this class. Empty when the
    /// original definition is unknown.
    pub original: Vec<u8>,
    pub new_bytes: Vec<u8>,
    /// Validation detail that justified creating this request.
    pub validation_detail: String,
    /// The event this request causally descends from.
    pub caused_by: EventId,
    pub reason: String,
}

impl HotSwapRequest {
    pub fn new(
        class_name: impl Into<SmolStr>,
        path: impl Into<PathBuf>,
        original: Vec<u8>,
        new_bytes: Vec<u8>,
        validation_detail: impl Into<String>,
        caused_by: EventId,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: SwapRequestId::new(),
            class_name: class_name.into(),
            path: path.into(),
            original,
            new_bytes,
            validation_detail: validation_detail.into(),
            caused_by,
            reason: reason.into(),
        }
    }

    pub fn original_sha256(&self) -> String {
        sha256_hex(&self.original)
    }

    pub fn new_sha256(&self) -> String {
        sha256_hex(&self.new_bytes)
    }
}
