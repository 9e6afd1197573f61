// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instrumentation port
//!
//! Abstraction over the platform's class-redefinition primitive. An
//! implementation MUST NOT simulate success: where no real primitive exists,
//! every request is refused with `UnsupportedChange` (see
//! [`UnsupportedInstrumentation`]).

use async_trait::async_trait;
use smol_str::SmolStr;
use thiserror::Error;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeInstrumentation, InstrumentationCall};

/// Handle to a class the platform currently has loaded.
///
/// Carries the platform's retained bytecode for the current definition:
/// the "original" side of a validation.
#[derive(Debug, Clone)]
pub struct LoadedClass {
    pub name: SmolStr,
    pub bytecode: Vec<u8>,
}

/// What the platform reports after a successful redefinition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedefineReport {
    /// Instance field layout is unchanged by the swap.
    pub layout_preserved: bool,
    /// Every live instance's method table now points at the new definition.
    pub methods_migrated: bool,
    pub detail: Option<String>,
}

/// Errors from the platform redefinition primitive.
#[derive(Debug, Error)]
pub enum RedefinitionError {
    #[error("unsupported change: {0}")]
    UnsupportedChange(String),
    #[error("verification failed: {0}")]
    VerificationFailed(String),
    #[error("class not found: {0}")]
    ClassNotFound(String),
    #[error("platform error: {0}")]
    Platform(String),
}

impl RedefinitionError {
    /// Short reason name carried in failure events.
    pub fn reason(&self) -> &'static str {
        match self {
            RedefinitionError::UnsupportedChange(_) => "UnsupportedChange",
            RedefinitionError::VerificationFailed(_) => "VerificationFailed",
            RedefinitionError::ClassNotFound(_) => "ClassNotFound",
            RedefinitionError::Platform(_) => "PlatformError",
        }
    }
}

/// The platform's class-redefinition capability.
#[async_trait]
pub trait Instrumentation: Send + Sync {
    /// Look up a loaded class by fully-qualified name.
    async fn find_loaded_class(&self, name: &str) -> Option<LoadedClass>;

    /// Replace the class's bytecode. The platform performs its own
    /// synchronization; the caller serializes per class.
    async fn redefine(
        &self,
        class: &LoadedClass,
        new_bytes: &[u8],
    ) -> Result<RedefineReport, RedefinitionError>;

    fn is_redefinition_supported(&self) -> bool;
}

/// The honest null implementation: no redefinition primitive exists here.
///
/// Used when the agent runs without an embedding platform. Never simulates
/// success.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedInstrumentation;

#[async_trait]
impl Instrumentation for UnsupportedInstrumentation {
    async fn find_loaded_class(&self, _name: &str) -> Option<LoadedClass> {
        None
    }

    async fn redefine(
        &self,
        _class: &LoadedClass,
        _new_bytes: &[u8],
    ) -> Result<RedefineReport, RedefinitionError> {
        Err(RedefinitionError::UnsupportedChange(
            "no redefinition primitive on this platform".to_string(),
        ))
    }

    fn is_redefinition_supported(&self) -> bool {
        false
    }
}
