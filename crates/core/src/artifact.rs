// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk class artifacts

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use smol_str::SmolStr;
use std::path::{Path, PathBuf};

/// Hex-encoded SHA-256 of a byte slice.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest {
        use std::fmt::Write;
        // write! to a String cannot fail
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// One observation of a class file on disk.
///
/// Immutable per observation; a subsequent change to the same path produces
/// a new artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassArtifact {
    path: PathBuf,
    class_name: SmolStr,
    size_bytes: u64,
    sha256: String,
    modified_at_ms: u64,
}

impl ClassArtifact {
    /// Record an observation of `bytes` at `path`.
    pub fn observe(
        path: impl Into<PathBuf>,
        class_name: impl Into<SmolStr>,
        bytes: &[u8],
        modified_at_ms: u64,
    ) -> Self {
        Self {
            path: path.into(),
            class_name: class_name.into(),
            size_bytes: bytes.len() as u64,
            sha256: sha256_hex(bytes),
            modified_at_ms,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn modified_at_ms(&self) -> u64 {
        self.modified_at_ms
    }

    /// True when `other` carries the same content hash.
    pub fn same_content(&self, other: &ClassArtifact) -> bool {
        self.sha256 == other.sha256
    }
}

/// Derive a class name from a file path: the file stem, verbatim.
///
/// This is the provisional name used before the analyzer extracts the
/// fully-qualified name from the bytes themselves.
pub fn class_name_from_path(path: &Path) -> SmolStr {
    path.file_stem()
        .map(|s| SmolStr::new(s.to_string_lossy()))
        .unwrap_or_else(|| SmolStr::new("<unknown>"))
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
